//! Shared helpers for integration tests
//!
//! Builds small project trees on disk inside a temporary directory.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use uniboost::modules::api::AggregatorOptions;

/// A project root with `src/pages.json` and `src/modules/<name>/module.json`
pub struct ProjectTree {
    dir: TempDir,
}

impl ProjectTree {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("create temp dir");
        fs::create_dir_all(dir.path().join("src/modules")).expect("create module root");
        Self { dir }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    /// Write `content` to `relative`, creating parent directories
    pub fn write(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent dir");
        }
        fs::write(&path, content).expect("write file");
        path
    }

    pub fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.path(relative)).expect("read file")
    }

    pub fn with_pages(self, content: &str) -> Self {
        self.write("src/pages.json", content);
        self
    }

    /// Add a module descriptor under `src/modules/<name>`
    pub fn with_module(self, name: &str, descriptor: &str) -> Self {
        self.write(&format!("src/modules/{}/module.json", name), descriptor);
        self
    }

    pub fn options(&self) -> AggregatorOptions {
        AggregatorOptions {
            root: self.root().to_path_buf(),
            ..Default::default()
        }
    }
}

/// Descriptor with one page per path
pub fn descriptor(pages: &[&str]) -> String {
    let pages: Vec<String> = pages
        .iter()
        .map(|path| format!(r#"{{"path":"{}"}}"#, path))
        .collect();
    format!(r#"{{"setting":{{"pages":[{}]}}}}"#, pages.join(","))
}

/// A two-module shop project with routes, hooks and static assets
pub fn shop_project() -> ProjectTree {
    let tree = ProjectTree::new()
        .with_pages(r#"{"pages":[{"path":"pages/index/index"}],"globalStyle":{"navigationBarTitleText":"Shop"}}"#)
        .with_module(
            "cart",
            r#"{
                "setting": {
                    "pages": [{"path": "pages/cart/index"}],
                    "subPackages": [{"root": "pkgCart", "pages": ["detail"], "asyncComponent": true}]
                },
                "route": {"cart": "/pages/cart/index"},
                "hookPlugins": ["./hooks/cartHook.ts"],
                "static": "static"
            }"#,
        )
        .with_module(
            "user",
            r#"{
                "setting": {"pages": [{"path": "pages/user/index"}]},
                "route": {"user": "/pages/user/index"}
            }"#,
        );
    tree.write("src/modules/cart/static/logo.png", "png");
    tree.write("src/modules/cart/static/icons/add.svg", "<svg/>");
    tree.write("src/route.config.json", r#"{"home":"/pages/index/index"}"#);
    tree
}
