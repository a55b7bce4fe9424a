//! Integration tests for the transform entry point.
//!
//! These exercise the whole engine against real files on disk: descriptor
//! stripping, loader-chain rebuilds, cross-package crawls and the dead
//! import sweep. Unit tests for individual components live next to them in
//! src/.

use sidecut::{Dialect, Engine, EngineConfig, Side, SidecutError};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn engine(side: Side) -> Engine {
    Engine::new(EngineConfig::new(side, Dialect::TypeScript))
}

fn transform(side: Side, path: &Path) -> Option<String> {
    let code = fs::read_to_string(path).unwrap();
    engine(side).transform(&path.to_string_lossy(), &code).unwrap()
}

/// A project with one descriptor module whose providers are declared in
/// sibling files carrying side decorators.
fn descriptor_fixture() -> (TempDir, std::path::PathBuf) {
    let temp = TempDir::new().unwrap();
    let src = temp.path().join("src");
    fs::create_dir_all(&src).unwrap();

    fs::write(
        src.join("auth.module.ts"),
        r#"import { SessionStore } from "./session-store";
import { LoginWidget } from "./login-widget";
defineModule({
    name: "auth",
    version: "1.0.0",
    controllers: [AuthController],
    components: [LoginForm],
    providers: [SessionStore, LoginWidget],
    debugHooks: [TraceHook]
});
"#,
    )
    .unwrap();
    fs::write(
        src.join("session-store.ts"),
        "@RunsOn(Side.Server)\nexport class SessionStore {}\n",
    )
    .unwrap();
    fs::write(
        src.join("login-widget.ts"),
        "@Provide({ side: Side.Client })\nexport class LoginWidget {}\n",
    )
    .unwrap();

    let module = src.join("auth.module.ts");
    (temp, module)
}

#[test]
fn client_build_strips_server_fields_and_providers() {
    let (_temp, module) = descriptor_fixture();
    let out = transform(Side::Client, &module).unwrap();

    assert!(out.contains("\"auth\""));
    assert!(out.contains("\"1.0.0\""));
    assert!(!out.contains("controllers"));
    assert!(out.contains("components"));
    assert!(!out.contains("debugHooks"));
    assert!(out.contains("LoginWidget"));
    assert!(!out.contains("SessionStore"));
}

#[test]
fn server_build_strips_client_fields_and_providers() {
    let (_temp, module) = descriptor_fixture();
    let out = transform(Side::Server, &module).unwrap();

    assert!(out.contains("\"auth\""));
    assert!(out.contains("\"1.0.0\""));
    assert!(out.contains("controllers"));
    assert!(!out.contains("components"));
    assert!(out.contains("SessionStore"));
    assert!(!out.contains("LoginWidget"));
}

#[test]
fn client_and_server_outputs_are_symmetric() {
    let (_temp, module) = descriptor_fixture();
    let client = transform(Side::Client, &module).unwrap();
    let server = transform(Side::Server, &module).unwrap();

    // Identity fields survive identically on both sides.
    for out in [&client, &server] {
        assert!(out.contains("name: \"auth\""));
        assert!(out.contains("version: \"1.0.0\""));
    }

    // Sided fields are removed disjointly: nothing sided shows up on both.
    for sided in ["controllers", "components", "SessionStore", "LoginWidget"] {
        assert!(
            !(client.contains(sided) && server.contains(sided)),
            "{} kept on both sides",
            sided
        );
    }
}

#[test]
fn disabled_descriptor_keeps_exactly_name_and_version() {
    let temp = TempDir::new().unwrap();
    let module = temp.path().join("off.module.ts");
    fs::write(
        &module,
        r#"defineModule({
    name: "off",
    version: "3.0.0",
    disabled: true,
    controllers: [Ctl],
    components: [Cmp],
    custom: "stays-normally"
});
"#,
    )
    .unwrap();

    for side in [Side::Client, Side::Server] {
        let out = transform(side, &module).unwrap();
        assert!(out.contains("\"off\""));
        assert!(out.contains("\"3.0.0\""));
        assert!(!out.contains("controllers"));
        assert!(!out.contains("components"));
        assert!(!out.contains("custom"));
        assert!(!out.contains("disabled"));
    }
}

#[test]
fn loader_chain_is_rebuilt_from_survivors() {
    let temp = TempDir::new().unwrap();
    for (pkg, body) in [
        ("alpha", "@RunsOn(Side.Server)\nexport class Alpha {}\n"),
        ("beta", "export class Beta {}\n"),
        ("gamma", "@Provide({ side: Side.Client })\nexport class Gamma {}\n"),
    ] {
        let dir = temp.path().join("node_modules").join(pkg);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("index.ts"), body).unwrap();
    }

    let main = temp.path().join("main.ts");
    fs::write(
        &main,
        r#"import { Alpha } from "alpha";
import { Beta } from "beta";
import { Gamma } from "gamma";
useApi().useLoader(Alpha).useLoader(Beta).useLoader(Gamma);
"#,
    )
    .unwrap();

    let out = transform(Side::Client, &main).unwrap();
    assert!(out.contains("useApi().useLoader(Beta).useLoader(Gamma)"));
    assert!(!out.contains("Alpha"));
    assert!(out.contains("from \"beta\""));
    assert!(out.contains("from \"gamma\""));
}

#[test]
fn loader_declared_through_a_barrel_is_still_resolved() {
    let temp = TempDir::new().unwrap();
    let pkg = temp.path().join("node_modules/stores");
    fs::create_dir_all(&pkg).unwrap();
    fs::write(pkg.join("index.ts"), "export * from \"./store-loader\";\n").unwrap();
    fs::write(
        pkg.join("store-loader.ts"),
        "@RunsOn(Side.Server)\nexport class StoreLoader {}\n",
    )
    .unwrap();

    let main = temp.path().join("main.ts");
    fs::write(
        &main,
        "import { StoreLoader } from \"stores\";\nuseApi().useLoader(StoreLoader);\n",
    )
    .unwrap();

    let out = transform(Side::Client, &main).unwrap();
    assert!(!out.contains("StoreLoader"));
    assert!(out.contains("useApi()"));
}

#[test]
fn version_is_injected_from_a_manifest_two_directories_up() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("package.json"),
        r#"{"name": "app", "version": "2.3.1"}"#,
    )
    .unwrap();
    let deep = temp.path().join("src/modules");
    fs::create_dir_all(&deep).unwrap();
    let module = deep.join("feature.module.ts");
    fs::write(&module, "defineModule({\n    name: \"feature\"\n});\n").unwrap();

    let out = transform(Side::Client, &module).unwrap();
    assert!(out.contains("version"));
    assert!(out.contains("2.3.1"));
}

#[test]
fn explicit_version_field_is_not_duplicated() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("package.json"), r#"{"version": "9.9.9"}"#).unwrap();
    let module = temp.path().join("pinned.module.ts");
    fs::write(
        &module,
        "defineModule({\n    name: \"pinned\",\n    version: \"1.2.3\"\n});\n",
    )
    .unwrap();

    let out = transform(Side::Client, &module).unwrap();
    assert!(out.contains("1.2.3"));
    assert!(!out.contains("9.9.9"));
    assert_eq!(out.matches("version").count(), 1);
}

#[test]
fn dynamic_version_field_suppresses_injection() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("package.json"), r#"{"version": "9.9.9"}"#).unwrap();
    let module = temp.path().join("dyn.module.ts");
    fs::write(
        &module,
        "defineModule({\n    name: \"dyn\",\n    version: APP_VERSION\n});\n",
    )
    .unwrap();

    let out = transform(Side::Client, &module).unwrap();
    assert!(out.contains("APP_VERSION"));
    assert!(!out.contains("9.9.9"));
    assert_eq!(out.matches("version").count(), 1);
}

#[test]
fn files_matching_neither_shape_pass_through_unchanged() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("plain.ts");
    fs::write(
        &file,
        "import { helper } from \"./helper\";\nexport const x = helper();\n",
    )
    .unwrap();

    assert_eq!(transform(Side::Client, &file), None);
}

#[test]
fn unreadable_side_annotation_aborts_the_file() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("broken.ts"),
        "@RunsOn(42)\nexport class Broken {}\n",
    )
    .unwrap();
    let module = temp.path().join("m.module.ts");
    fs::write(
        &module,
        "import { Broken } from \"./broken\";\ndefineModule({\n    name: \"m\",\n    providers: [Broken]\n});\n",
    )
    .unwrap();

    let code = fs::read_to_string(&module).unwrap();
    let err = engine(Side::Client)
        .transform(&module.to_string_lossy(), &code)
        .unwrap_err();
    assert!(matches!(err, SidecutError::Metadata { .. }));
}

#[test]
fn unresolved_providers_are_kept_as_neutral() {
    let temp = TempDir::new().unwrap();
    let module = temp.path().join("loose.module.ts");
    fs::write(
        &module,
        "import { Mystery } from \"./missing\";\ndefineModule({\n    name: \"loose\",\n    providers: [Mystery]\n});\n",
    )
    .unwrap();

    let out = transform(Side::Server, &module).unwrap();
    assert!(out.contains("Mystery"));
}
