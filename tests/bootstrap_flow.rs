//! End-to-end bootstrap flows over a real shop tree built with `Scaffold`.

use modharness::{Bootstrap, BootstrapError, HostState, ResolverRegistry, Scaffold};
use tempfile::tempdir;

const FOO_METADATA: &[u8] = b"\
[module]
id = \"srfoo\"

[files]
\"FooController\" = \"controllers/foo.rs\"
";

const BAR_METADATA: &[u8] = b"\
[module]
id = \"srbar\"

[files]
\"BarModel\" = \"models/bar.rs\"
";

/// Builds a shop base directory with two modules and a vendor manifest.
fn shop_tree(root: &std::path::Path) -> Scaffold {
    let sc = Scaffold::new(root.join("shop")).expect("scaffold");
    sc.create_file("modules/foo/metadata.toml", Some(FOO_METADATA))
        .expect("foo metadata");
    sc.create_file("modules/bar/metadata.toml", Some(BAR_METADATA))
        .expect("bar metadata");
    sc.create_file(
        "vendor/autoload.toml",
        Some(b"[files]\n\"Logger\" = \"lib/logger.rs\"\n"),
    )
    .expect("vendor manifest");
    sc
}

#[test]
fn bootstrap_from_shop_base_resolves_all_modules() {
    let td = tempdir().expect("tempdir");
    let sc = shop_tree(td.path());

    let mut boot = Bootstrap::create(Some(sc.root().to_path_buf()));
    let registry = ResolverRegistry::new();
    let ready = boot.bootstrap(&registry).expect("bootstrap");

    // Both modules and the vendor manifest resolve through the registry.
    assert_eq!(
        registry.resolve("FooController"),
        Some(sc.full_path("modules/foo/controllers/foo.rs"))
    );
    assert_eq!(
        registry.resolve("BarModel"),
        Some(sc.full_path("modules/bar/models/bar.rs"))
    );
    assert_eq!(
        registry.resolve("Logger"),
        Some(sc.full_path("vendor/lib/logger.rs"))
    );
    assert_eq!(registry.resolve("Unknown"), None);

    // Registrations are revocable through the returned handles.
    assert!(registry.unregister(ready.module_resolver));
    assert_eq!(registry.resolve("FooController"), None);
    let vendor = ready.vendor_resolver.expect("vendor manifest registered");
    assert!(registry.unregister(vendor));
    assert!(registry.is_empty());
}

#[test]
fn bootstrap_from_module_dir_resolves_only_that_module() {
    let td = tempdir().expect("tempdir");
    let sc = shop_tree(td.path());

    // Tests run from inside module `foo`.
    let test_dir = sc.create_directory("modules/foo/tests").expect("tests dir");
    let mut boot = Bootstrap::create(Some(test_dir));
    let registry = ResolverRegistry::new();
    boot.bootstrap(&registry).expect("bootstrap");

    assert_eq!(
        registry.resolve("FooController"),
        Some(sc.full_path("modules/foo/controllers/foo.rs"))
    );
    assert_eq!(registry.resolve("BarModel"), None, "sibling module not visible");
}

#[test]
fn mandatory_host_with_manifest_loads() {
    let td = tempdir().expect("tempdir");
    let sc = shop_tree(td.path());
    sc.create_file("bootstrap.toml", Some(b"[shop]\nname = \"demo\"\n"))
        .expect("host manifest");

    let mut boot = Bootstrap::create(Some(sc.root().to_path_buf()));
    boot.load_host_framework();
    boot.bootstrap(&ResolverRegistry::new()).expect("bootstrap");
    assert_eq!(boot.host_state(), HostState::Loaded);
}

#[test]
fn mandatory_host_without_manifest_fails() {
    let td = tempdir().expect("tempdir");
    let sc = shop_tree(td.path());

    let mut boot = Bootstrap::create(Some(sc.root().to_path_buf()));
    boot.load_host_framework();
    let err = boot
        .bootstrap(&ResolverRegistry::new())
        .expect_err("host is missing");
    assert!(matches!(err, BootstrapError::HostNotLoaded));
    assert_eq!(boot.host_state(), HostState::RequiredButMissing);
}

#[test]
fn optional_host_missing_is_fine() {
    let td = tempdir().expect("tempdir");
    let sc = shop_tree(td.path());

    let mut boot = Bootstrap::create(Some(sc.root().to_path_buf()));
    boot.bootstrap(&ResolverRegistry::new()).expect("bootstrap");
    assert_eq!(boot.host_state(), HostState::NotRequested);
}

#[test]
fn missing_vendor_manifest_is_skipped_silently() {
    let td = tempdir().expect("tempdir");
    let sc = Scaffold::new(td.path().join("shop")).expect("scaffold");
    sc.create_file("modules/foo/metadata.toml", Some(FOO_METADATA))
        .expect("foo metadata");

    let mut boot = Bootstrap::create(Some(sc.root().to_path_buf()));
    let registry = ResolverRegistry::new();
    let ready = boot.bootstrap(&registry).expect("bootstrap");
    assert!(ready.vendor_resolver.is_none());
    assert_eq!(registry.len(), 1, "only the module resolver is registered");
}

#[test]
fn descriptor_created_after_bootstrap_is_still_resolved() {
    let td = tempdir().expect("tempdir");
    let sc = Scaffold::new(td.path().join("shop")).expect("scaffold");
    let test_dir = sc.create_directory("modules/late/tests").expect("tests dir");
    sc.create_file("modules/late/metadata.toml", Some(b"[module]\nid = \"late\"\n"))
        .expect("marker descriptor");

    let mut boot = Bootstrap::create(Some(test_dir));
    let registry = ResolverRegistry::new();
    boot.bootstrap(&registry).expect("bootstrap");

    // The descriptor grows an entry only after bootstrap; the resolver
    // reads it lazily on first use.
    sc.create_file(
        "modules/late/metadata.toml",
        Some(b"[module]\nid = \"late\"\n[files]\n\"LateType\" = \"late.rs\"\n"),
    )
    .expect("rewrite descriptor");

    assert_eq!(
        registry.resolve("LateType"),
        Some(sc.full_path("modules/late/late.rs"))
    );
}
