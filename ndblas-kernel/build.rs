fn main() {
    println!("cargo:rerun-if-env-changed=OPENBLAS_LIB_DIR");

    #[cfg(feature = "blas")]
    {
        // The `blas` backend resolves CBLAS symbols from OpenBLAS.
        // Debian/Ubuntu: libopenblas-dev, macOS: brew install openblas
        if let Ok(lib_dir) = std::env::var("OPENBLAS_LIB_DIR") {
            println!("cargo:rustc-link-search=native={}", lib_dir);
        } else if cfg!(target_os = "macos") {
            println!("cargo:rustc-link-search=native=/opt/homebrew/opt/openblas/lib");
            println!("cargo:rustc-link-search=native=/usr/local/opt/openblas/lib");
        }
        println!("cargo:rustc-link-lib=openblas");
    }
}
