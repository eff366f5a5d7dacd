use std::env;
use std::fs;
use std::path::Path;

fn main() {
    // Copy the sample probe plan next to the built executable
    copy_plan();
}

/// Copies probe.json to the target directory.
fn copy_plan() {
    let out_dir = env::var("OUT_DIR").unwrap();
    // OUT_DIR is something like target/release/build/panel-vision-xxx/out
    let out_path = Path::new(&out_dir);
    let target_dir = out_path
        .ancestors()
        .nth(3) // Go up 3 levels: out -> hash -> build -> release
        .expect("Could not find target directory");

    let plan_src = Path::new("probe.json");
    let plan_dst = target_dir.join("probe.json");

    if plan_src.exists() {
        let _ = fs::copy(plan_src, &plan_dst);
    }
    println!("cargo:rerun-if-changed=probe.json");
}
