/// End-to-end scan integration tests.
///
/// These drive the real `FreshScan` and `ImportDriver` step by step against
/// a temporary filesystem, exactly as the run loop does, and check what
/// ends up in the sinks.
use disktally_core::cli::{parse_args, Invocation};
use disktally_core::config::{Config, DataSink, DataSource, FileArg};
use disktally_core::delete::{DeleteStep, Deleter};
use disktally_core::model::{ExcludeReason, FileTree, NodeIndex};
use disktally_core::pipeline;
use disktally_core::scan::walker::WalkOptions;
use disktally_core::scan::{FreshScan, ImportDriver, ScanState, SourceDriver, SourceStep};
use disktally_core::sink::{ExportSink, MemorySink, Sink};
use std::fs;
use std::io::{BufReader, Write};
use std::path::Path;
use tempfile::TempDir;

// ── Helpers ──────────────────────────────────────────────────────────────────

/// ```text
/// root/
///   alpha/
///     a.txt   (100 bytes)
///     b.rs    (200 bytes)
///   beta/
///     c.png   (300 bytes)
///   d.zip     (400 bytes)
/// ```
fn build_test_tree(root: &Path) {
    let alpha = root.join("alpha");
    let beta = root.join("beta");
    fs::create_dir_all(&alpha).unwrap();
    fs::create_dir_all(&beta).unwrap();

    write_bytes(&alpha.join("a.txt"), 100);
    write_bytes(&alpha.join("b.rs"), 200);
    write_bytes(&beta.join("c.png"), 300);
    write_bytes(&root.join("d.zip"), 400);
}

fn write_bytes(path: &Path, n: usize) {
    let mut f = fs::File::create(path).unwrap();
    f.write_all(&vec![0u8; n]).unwrap();
}

/// Step `source` until it finishes, then return the sink's result.
fn drive(source: &mut dyn SourceDriver, sink: &mut dyn Sink) -> (ScanState, Option<FileTree>) {
    let mut state = ScanState::new();
    let mut steps = 0;
    while source.step(&mut state, sink) == SourceStep::Working {
        steps += 1;
        assert!(steps < 100_000, "source did not finish");
    }
    let tree = sink.finish().unwrap();
    (state, tree)
}

fn child_named(tree: &FileTree, parent: NodeIndex, name: &str) -> NodeIndex {
    tree.children(parent)
        .into_iter()
        .find(|&c| tree.node(c).name == name)
        .unwrap_or_else(|| panic!("no child named {name}"))
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[test]
fn scan_builds_tree_with_apparent_sizes() {
    let tmp = TempDir::new().expect("failed to create temp dir");
    build_test_tree(tmp.path());

    let mut scan = FreshScan::new(tmp.path(), WalkOptions::default());
    let (state, tree) = drive(&mut scan, &mut MemorySink::new());
    let tree = tree.expect("memory sink returns a tree");

    assert!(!state.has_fatal_error());
    assert!(state.errors.soft().is_none());
    // root + 2 dirs + 4 files
    assert_eq!(state.items, 7);

    let root = tree.root.unwrap();
    let alpha = child_named(&tree, root, "alpha");
    let file_bytes: u64 = tree
        .children(alpha)
        .into_iter()
        .map(|c| tree.node(c).size)
        .sum();
    assert_eq!(file_bytes, 300);
    assert!(tree.node(root).size >= 1_000);
    assert_eq!(tree.node(root).descendant_count, 6);
    assert_eq!(tree.full_path(root), fs::canonicalize(tmp.path()).unwrap());
}

#[test]
fn scan_empty_directory() {
    let tmp = TempDir::new().expect("failed to create temp dir");
    let mut scan = FreshScan::new(tmp.path(), WalkOptions::default());
    let (state, tree) = drive(&mut scan, &mut MemorySink::new());
    assert_eq!(state.items, 1);
    assert_eq!(tree.unwrap().len(), 1);
}

#[test]
fn cachedir_tagged_directory_is_excluded() {
    let tmp = TempDir::new().unwrap();
    build_test_tree(tmp.path());
    fs::write(
        tmp.path().join("beta/CACHEDIR.TAG"),
        b"Signature: 8a477f597d28d172789f06886806bc55\n",
    )
    .unwrap();

    let options = WalkOptions {
        exclude_caches: true,
        ..WalkOptions::default()
    };
    let mut scan = FreshScan::new(tmp.path(), options);
    let (_, tree) = drive(&mut scan, &mut MemorySink::new());
    let tree = tree.unwrap();

    let beta = child_named(&tree, tree.root.unwrap(), "beta");
    assert_eq!(tree.node(beta).excluded, Some(ExcludeReason::CacheDir));
    assert!(tree.children(beta).is_empty());
}

#[cfg(unix)]
#[test]
fn symlinks_are_followed_only_when_asked() {
    let tmp = TempDir::new().unwrap();
    write_bytes(&tmp.path().join("big.bin"), 5_000);
    std::os::unix::fs::symlink(tmp.path().join("big.bin"), tmp.path().join("link")).unwrap();

    let size_of_link = |follow: bool| {
        let options = WalkOptions {
            follow_symlinks: follow,
            ..WalkOptions::default()
        };
        let mut scan = FreshScan::new(tmp.path(), options);
        let (_, tree) = drive(&mut scan, &mut MemorySink::new());
        let tree = tree.unwrap();
        let link = child_named(&tree, tree.root.unwrap(), "link");
        tree.node(link).size
    };

    assert!(size_of_link(false) < 5_000);
    assert_eq!(size_of_link(true), 5_000);
}

#[cfg(unix)]
#[test]
fn unreadable_directory_sets_soft_error_and_continues() {
    use std::os::unix::fs::PermissionsExt;

    let tmp = TempDir::new().unwrap();
    build_test_tree(tmp.path());
    let locked = tmp.path().join("locked");
    fs::create_dir(&locked).unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
    // Privileged users can read anything; nothing to observe then.
    if fs::read_dir(&locked).is_ok() {
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        return;
    }

    let mut scan = FreshScan::new(tmp.path(), WalkOptions::default());
    let (state, tree) = drive(&mut scan, &mut MemorySink::new());
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

    assert!(!state.has_fatal_error());
    let soft = state.errors.soft_lossy().expect("soft error recorded");
    assert!(soft.ends_with("/locked"), "{soft}");
    let tree = tree.unwrap();
    let node = child_named(&tree, tree.root.unwrap(), "locked");
    assert!(tree.node(node).is_error);
    assert_eq!(state.items, 8);
}

#[test]
fn export_then_import_reproduces_totals() {
    let tmp = TempDir::new().unwrap();
    let data = tmp.path().join("data");
    fs::create_dir(&data).unwrap();
    build_test_tree(&data);
    let export_path = tmp.path().join("out.json");

    let file = fs::File::create(&export_path).unwrap();
    let mut export = ExportSink::new(Box::new(std::io::BufWriter::new(file))).unwrap();
    let mut scan = FreshScan::new(&data, WalkOptions::default());
    let (scanned, tree) = drive(&mut scan, &mut export);
    assert!(tree.is_none(), "export sink keeps no tree");
    drop(export);

    let reader = BufReader::new(fs::File::open(&export_path).unwrap());
    let mut import = ImportDriver::new(Box::new(reader));
    let (imported, tree) = drive(&mut import, &mut MemorySink::new());
    let tree = tree.unwrap();

    assert!(!imported.has_fatal_error());
    assert_eq!(imported.items, scanned.items);
    assert_eq!(imported.size, scanned.size);
    assert_eq!(tree.node(tree.root.unwrap()).size, scanned.size);
    assert_eq!(
        imported.cursor.to_path_buf(),
        fs::canonicalize(&data).unwrap()
    );
}

#[test]
fn pipeline_honours_parsed_options() {
    let tmp = TempDir::new().unwrap();
    build_test_tree(tmp.path());
    let out = tmp.path().join("export.json");
    let dir = tmp.path().to_str().unwrap();
    let out_arg = out.to_str().unwrap();

    let Invocation::Run(config) =
        parse_args(["--exclude", "*.zip", "-o", out_arg, dir], false).unwrap()
    else {
        panic!("expected a run invocation");
    };
    assert_eq!(config.sink, DataSink::Export(FileArg::Path(out.clone())));

    let mut pipeline = pipeline::open(&config).unwrap();
    assert!(!pipeline.browsable);
    let (state, _) = drive(pipeline.source.as_mut(), pipeline.sink.as_mut());
    drop(pipeline);

    assert!(!state.has_fatal_error());
    let text = fs::read_to_string(&out).unwrap();
    assert!(text.lines().any(|l| l.contains("\"d.zip\"") && l.contains("\"pattern\"")));
}

#[test]
fn missing_scan_root_is_fatal() {
    let tmp = TempDir::new().unwrap();
    let config = Config {
        source: DataSource::Scan(tmp.path().join("missing")),
        ..Config::default()
    };
    let mut pipeline = pipeline::open(&config).unwrap();
    let (state, _) = drive(pipeline.source.as_mut(), pipeline.sink.as_mut());
    assert!(state.has_fatal_error());
    assert!(state.cursor.to_string_lossy().ends_with("/missing"));
}

#[test]
fn delete_then_unlink_keeps_tree_consistent() {
    let tmp = TempDir::new().unwrap();
    build_test_tree(tmp.path());

    let mut scan = FreshScan::new(tmp.path(), WalkOptions::default());
    let (_, tree) = drive(&mut scan, &mut MemorySink::new());
    let mut tree = tree.unwrap();
    let root = tree.root.unwrap();
    let alpha = child_named(&tree, root, "alpha");
    let before = tree.node(root).size;
    let alpha_size = tree.node(alpha).size;

    let mut deleter = Deleter::new(tree.full_path(alpha));
    while deleter.step().unwrap() == DeleteStep::Working {}
    assert!(!tmp.path().join("alpha").exists());

    assert!(tree.remove_child(root, alpha));
    assert_eq!(tree.node(root).size, before - alpha_size);
    assert!(tree.children(root).iter().all(|&c| tree.node(c).name != "alpha"));
}
