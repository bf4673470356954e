//! Placement of classes, namespace columns, and the legend.

use std::{collections::HashSet, convert::Infallible};

use d2_document::quote;

use super::sink::{Command, DiagramSink};
use crate::{
	label::{short_label, verticalize},
	workload::{Aggregation, Workload, WorkloadKind},
};

/// Namespace whose footer is highlighted.
pub const SYSTEM_NAMESPACE: &str = "kube-system";

const BASE_CLASS: &str = "base";
const BASE_FILL: &str = "#fff";

const SYSTEM_FOOTER_FILL: &str = "linear-gradient(#ffe5e5, #ff9999)";
const FOOTER_FILL: &str = "linear-gradient(#ebf3fa, #cfe2f3)";

/// Composite class reference of namespace footers.
///
/// D2 only understands the list unquoted, so it is wrapped in `<`/`>`
/// markers that are stripped together with the quotes after formatting.
pub const FOOTER_CLASS: &str = "<[base; block]>";

/// Issue every operation of the diagram against `sink`, in a fixed order.
pub fn build<S: DiagramSink>(aggregation: &Aggregation, sink: &mut S) -> Result<(), S::Error> {
	define_classes(sink)?;
	build_table(aggregation, sink)?;
	build_spacer(sink)?;
	build_legend(sink)
}

/// The operations [`build`] issues, as a list.
pub fn plan(aggregation: &Aggregation) -> Vec<Command> {
	let mut commands = Vec::new();
	let result: Result<(), Infallible> = build(aggregation, &mut commands);
	match result {
		Ok(()) => commands,
		Err(never) => match never {},
	}
}

fn define_classes<S: DiagramSink>(sink: &mut S) -> Result<(), S::Error> {
	let classes = WorkloadKind::ALL
		.iter()
		.map(|kind| (kind.class_name(), kind.color()))
		.chain([(BASE_CLASS, BASE_FILL)]);

	for (class, fill) in classes {
		let style = format!("classes.{class}.style");
		sink.set(&format!("{style}.fill"), fill)?;
		sink.set(&format!("{style}.font-size"), "40")?;
		sink.set(&format!("{style}.font"), "mono")?;
		sink.set(&format!("{style}.border-radius"), "6")?;
		sink.set(&format!("{style}.stroke-width"), "0")?;
	}
	Ok(())
}

fn build_table<S: DiagramSink>(aggregation: &Aggregation, sink: &mut S) -> Result<(), S::Error> {
	// D2 rejects a zero-column grid, an empty cluster still gets one
	let columns = aggregation.namespace_count().max(1);

	sink.create("table")?;
	sink.set("table.label", "")?;
	sink.set("table.grid-columns", &columns.to_string())?;
	sink.set("table.grid-gap", "0")?;
	sink.set("table.style.stroke-width", "1")?;
	sink.set("table.style.stroke-dash", "5")?;
	sink.set("table.style.fill", "white")?;

	let mut columns = Keys::new();
	for (namespace, workloads) in aggregation {
		let column = format!("table.{}", quote(&columns.claim(namespace)));
		build_namespace(&column, namespace, workloads, sink)?;
	}
	Ok(())
}

fn build_namespace<S: DiagramSink>(
	column: &str,
	namespace: &str,
	workloads: &[Workload],
	sink: &mut S,
) -> Result<(), S::Error> {
	sink.create(column)?;
	sink.set(&format!("{column}.label"), "")?;
	sink.set(&format!("{column}.grid-columns"), "1")?;
	sink.set(&format!("{column}.grid-gap"), "5")?;
	sink.set(&format!("{column}.style.fill"), "white")?;
	sink.set(&format!("{column}.style.stroke-width"), "0")?;

	let mut keys = Keys::new();
	let footer = format!("{column}.{}", quote(&keys.claim(namespace)));

	for workload in workloads {
		let label = short_label(workload.name());
		let key = keys.claim(&label);
		let cell = format!("{column}.{}", quote(&key));

		sink.set(&format!("{cell}.class"), workload.kind().class_name())?;
		if key != label {
			sink.set(&format!("{cell}.label"), &label)?;
		}
	}

	// Footer spans the column and names the namespace, one letter per line
	let fill = if namespace == SYSTEM_NAMESPACE {
		SYSTEM_FOOTER_FILL
	} else {
		FOOTER_FILL
	};
	sink.set(&format!("{footer}.label"), &verticalize(namespace))?;
	sink.set(&format!("{footer}.style.font-size"), "40")?;
	sink.set(&format!("{footer}.style.font-color"), "black")?;
	sink.set(&format!("{footer}.style.stroke-width"), "1")?;
	sink.set(&format!("{footer}.style.stroke-dash"), "5")?;
	sink.set(&format!("{footer}.style.fill"), fill)?;
	sink.set(&format!("{footer}.class"), FOOTER_CLASS)?;
	Ok(())
}

fn build_spacer<S: DiagramSink>(sink: &mut S) -> Result<(), S::Error> {
	sink.create("spacer")?;
	sink.set("spacer.label", "")?;
	sink.set("spacer.style.stroke-width", "0")?;
	sink.set("spacer.width", "50")
}

fn build_legend<S: DiagramSink>(sink: &mut S) -> Result<(), S::Error> {
	sink.create("key")?;
	sink.set("key.grid-gap", "10")?;
	sink.set("key.grid-columns", "1")?;
	sink.set("key.style.border-radius", "8")?;

	for kind in WorkloadKind::ALL {
		let entry = format!("key.{}", kind.class_name());
		sink.set(&format!("{entry}.style.border-radius"), "8")?;
		sink.set(&format!("{entry}.style.fill"), kind.color())?;
	}
	Ok(())
}

/// Keys D2 reads as fields of the enclosing container rather than children.
const RESERVED_KEYS: &[&str] = &[
	"_",
	"label",
	"shape",
	"icon",
	"tooltip",
	"link",
	"near",
	"width",
	"height",
	"top",
	"left",
	"direction",
	"constraint",
	"class",
	"classes",
	"style",
	"vars",
	"grid-rows",
	"grid-columns",
	"grid-gap",
	"vertical-gap",
	"horizontal-gap",
	"source-arrowhead",
	"target-arrowhead",
	"layers",
	"scenarios",
	"steps",
];

/// Hands out distinct child keys within one container.
///
/// D2 keys are case-insensitive, so uniqueness is checked on the lower-cased
/// key. D2 field names are never handed out.
struct Keys {
	used: HashSet<String>,
}

impl Keys {
	fn new() -> Self {
		Self {
			used: RESERVED_KEYS.iter().map(|k| (*k).to_string()).collect(),
		}
	}

	/// `wanted` itself if still free, otherwise `<wanted>-2`, `<wanted>-3`, ...
	fn claim(&mut self, wanted: &str) -> String {
		let base = if wanted.is_empty() { "cell" } else { wanted };

		let mut key = base.to_string();
		let mut n = 1;
		while !self.used.insert(key.to_lowercase()) {
			n += 1;
			key = format!("{base}-{n}");
		}
		key
	}
}
