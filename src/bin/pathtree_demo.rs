//! A small demo harness exercising [`pathtree::Tree`] end to end, the Rust
//! analogue of the original implementation's `main.c`.
//!
//! Run with `RUST_LOG=debug cargo run --bin pathtree-demo` to see the
//! operation-level log lines alongside the tree's output.
use pathtree::Tree;

fn main() {
    env_logger::init();

    let tree = Tree::new();
    tree.create("/a/").expect("create /a/");
    tree.create("/a/b/").expect("create /a/b/");
    tree.move_node("/a/b/", "/x/").expect("move /a/b/ to /x/");
    println!("{}", tree.list("/").unwrap_or_else(|| "none".to_string()));

    tree.remove("/a/").expect("remove /a/");
    println!("{}", tree.list("/").unwrap_or_else(|| "none".to_string()));

    tree.remove("/x/").expect("remove /x/");
}
