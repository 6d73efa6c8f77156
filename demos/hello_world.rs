use tree_vfs::{ConflictPolicy, FindOptions, FsBackend, Handle, TreeFS, WriteMode};

fn main() {
    // empty namespace, CWD (Current Working Dir) is `/`
    let mut fs = TreeFS::new();

    // creates `/docs` (and nothing else)
    fs.mkdir("/docs", false).unwrap();

    // change CWD to `/docs`
    fs.changedir("docs").unwrap();

    // `first.txt` is created in CWD because the path is relative
    fs.mkfile("first.txt", false).unwrap();
    fs.write_file("first.txt", "Hello", WriteMode::Overwrite).unwrap();
    assert!(fs.is_file("first.txt"));

    // `/drafts/second.txt` is created from the root because the path is absolute;
    // `/drafts` is created on the way
    fs.mkfile("/drafts/second.txt", true).unwrap();
    fs.write_file("/drafts/second.txt", "World", WriteMode::Overwrite).unwrap();

    // change CWD back to `/`
    fs.changedir("..").unwrap();

    // moves the second file next to the first one
    fs.move_file("/drafts/second.txt", "/docs/", ConflictPolicy::NoOverride, false)
        .unwrap();

    let first = fs.read_file("/docs/first.txt").unwrap();
    let second = fs.read_file("docs/second.txt").unwrap();
    println!("{first}, {second}!");

    // read handles keep their own cursor
    let mut reader = fs.open_read_handle("/docs/second.txt").unwrap();
    reader.move_cursor_abs(1);
    assert_eq!(reader.read_next(3), "orl");
    reader.close();

    let found = fs.find("[a-z]+\\.txt", "/", FindOptions::recursive()).unwrap();
    println!("text files: {:?}", found.files);

    // removes the whole `/docs` subtree
    fs.remove_dir("/docs").unwrap();
    assert!(!fs.exists("/docs/first.txt"));
}
