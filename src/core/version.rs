//! Build metadata recorded by the build script

/// UTC time the crate was compiled
pub fn build_time() -> &'static str {
    env!("UNIBOOST_BUILD_TIME")
}

/// Short commit hash, or `unknown` outside a git checkout
pub fn git_hash() -> &'static str {
    env!("UNIBOOST_GIT_HASH")
}

/// `uniboost --version` long form: version, commit and build time
pub fn long_version() -> String {
    format!(
        "{} ({} built {})",
        env!("CARGO_PKG_VERSION"),
        git_hash(),
        build_time()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_long_version_mentions_package_version() {
        let version = long_version();
        assert!(version.starts_with(env!("CARGO_PKG_VERSION")));
        assert!(version.contains(git_hash()));
    }
}
