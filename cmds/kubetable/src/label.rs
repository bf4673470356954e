//! Compact labels derived from resource names.

use itertools::Itertools;

/// Two-character key for a workload name.
///
/// Without a hyphen, the first character is upper-cased and the second is
/// kept as is (`traefik` becomes `Tr`). With hyphens, the first characters of
/// the first two segments are used, upper-cased and lower-cased respectively
/// (`argocd-dex-server` becomes `Ad`).
///
/// Names too short to provide both characters yield whatever is available,
/// so the result may be shorter than two characters (or empty).
pub fn short_label(name: &str) -> String {
	let mut label = String::with_capacity(2);

	if name.contains('-') {
		let mut segments = name.split('-');
		if let Some(first) = segments.next().and_then(|s| s.chars().next()) {
			label.extend(first.to_uppercase());
		}
		if let Some(second) = segments.next().and_then(|s| s.chars().next()) {
			label.extend(second.to_lowercase());
		}
	} else {
		let mut chars = name.chars();
		if let Some(first) = chars.next() {
			label.extend(first.to_uppercase());
		}
		if let Some(second) = chars.next() {
			label.push(second);
		}
	}

	label
}

/// Put every character of `s` on its own line.
pub fn verticalize(s: &str) -> String {
	s.chars().join("\n")
}

#[cfg(test)]
mod tests {
	use rstest::rstest;

	use super::*;

	#[rstest]
	#[case("prometheus-prometheus-kube-prometheus-prometheus", "Pp")]
	#[case("argocd-dex-server", "Ad")]
	#[case("traefik", "Tr")]
	#[case("nginx", "Ng")]
	#[case("nightly-backup", "Ni")]
	#[case("coredns", "Co")]
	fn test_short_label(#[case] input: &str, #[case] expected: &str) {
		assert_eq!(short_label(input), expected);
	}

	#[rstest]
	// second character is kept verbatim when there is no hyphen
	#[case("abc", "Ab")]
	#[case("aBc", "AB")]
	#[case("ABC", "AB")]
	// second segment is always lower-cased
	#[case("cert-Manager", "Cm")]
	#[case("Cert-MANAGER", "Cm")]
	fn test_short_label_casing(#[case] input: &str, #[case] expected: &str) {
		assert_eq!(short_label(input), expected);
	}

	#[rstest]
	#[case("", "")]
	#[case("a", "A")]
	#[case("-", "")]
	#[case("-x", "x")]
	#[case("a-", "A")]
	#[case("a--b", "A")]
	fn test_short_label_short_inputs(#[case] input: &str, #[case] expected: &str) {
		assert_eq!(short_label(input), expected);
	}

	#[test]
	fn test_short_label_unicode() {
		assert_eq!(short_label("écho"), "Éc");
		assert_eq!(short_label("über-Ärger"), "Üä");
	}

	#[test]
	fn test_verticalize() {
		assert_eq!(verticalize(""), "");
		assert_eq!(verticalize("x"), "x");
		assert_eq!(verticalize("foo"), "f\no\no");
		assert_eq!(verticalize("default"), "d\ne\nf\na\nu\nl\nt");
	}

	#[rstest]
	#[case("kube-system")]
	#[case("monitoring")]
	#[case("naïve")]
	fn test_verticalize_shape(#[case] input: &str) {
		let out = verticalize(input);
		let n = input.chars().count();

		assert_eq!(out.chars().count(), 2 * n - 1);
		assert_eq!(out.matches('\n').count(), n - 1);
		assert_eq!(out.replace('\n', ""), input);
	}
}
