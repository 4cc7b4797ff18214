fn main() {
    // Only build the switcher bundle when embed feature is enabled
    #[cfg(feature = "embed")]
    {
        use std::path::Path;
        use std::process::Command;

        let switcher_dir = Path::new("../verdoc-switcher");

        let output = Command::new("wasm-pack")
            .args([
                "build",
                "--target",
                "web",
                "--release",
                "--no-typescript",
                "--out-dir",
                "pkg",
            ])
            .args(["--", "--features", "wasm"])
            .current_dir(switcher_dir)
            .output()
            .expect("failed to run wasm-pack (is it installed?)");
        assert!(
            output.status.success(),
            "failed to build the version switcher:\n{}",
            String::from_utf8_lossy(&output.stderr)
        );

        // Rebuild if switcher sources or build script changes
        println!("cargo:rerun-if-changed=../verdoc-switcher/src");
        println!("cargo:rerun-if-changed=build.rs");
    }
}
