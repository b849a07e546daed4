use std::env;

fn main() {
    // ensure the build script is re-run if it changes
    println!("cargo:rerun-if-changed=build.rs");

    // the host probe is compiled for the target this crate is built for
    let target = env::var("TARGET").unwrap();
    println!("cargo:rustc-env=ABIGEN_TARGET={}", target);
}
