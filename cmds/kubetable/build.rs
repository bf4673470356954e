use std::process::Command;

fn main() {
	println!("cargo:rerun-if-changed=.git/HEAD");
	println!("cargo:rerun-if-changed=.git/refs/");
	println!("cargo:rerun-if-env-changed=KUBETABLE_RELEASE_VERSION");

	// Release builds pin the version explicitly, dev builds describe the checkout
	let version = std::env::var("KUBETABLE_RELEASE_VERSION")
		.ok()
		.filter(|v| !v.is_empty())
		.or_else(git_describe)
		.unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string());

	println!("cargo:rustc-env=KUBETABLE_VERSION={version}");
}

/// `0.2.0` on a tagged commit, `0.2.0-3-gabc1234` past it, or a short hash
/// when the repository has no tags at all.
fn git_describe() -> Option<String> {
	let output = Command::new("git")
		.args(["describe", "--tags", "--always"])
		.output()
		.ok()?;

	if !output.status.success() {
		return None;
	}

	let described = String::from_utf8(output.stdout).ok()?;
	let described = described.trim();
	if described.is_empty() {
		return None;
	}
	Some(described.strip_prefix('v').unwrap_or(described).to_string())
}
