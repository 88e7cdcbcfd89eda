fn main() {
    // libgit2 needs advapi32 when targeting Windows
    if matches!(std::env::var("CARGO_CFG_TARGET_OS").as_deref(), Ok("windows")) {
        println!("cargo:rustc-link-lib=advapi32");
    }
}
