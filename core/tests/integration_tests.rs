//! Cross-module scenarios: building, exchanging, and evolving parameter
//! trees the way a tool front-end does.

use param_tree_core::{
    DefaultsWarning, FlagRules, ParamTree, ReservedPaths, ToolInfo, TraceAction, Value, ValueKind,
};

fn tool_defaults() -> ParamTree {
    let mut defaults = ParamTree::new();
    defaults.set_value("version", "2.0", "Tool version");
    defaults.set_value("threads", 1i64, "Number of worker threads");
    defaults.set_min_int("threads", 1).unwrap();
    defaults.set_max_int("threads", 64).unwrap();
    defaults.set_value("algorithm:mode", "fast", "Search mode");
    defaults
        .set_valid_strings("algorithm:mode", &["fast", "thorough"])
        .unwrap();
    defaults.set_value("algorithm:tolerance", 0.5, "Match tolerance");
    defaults.set_min_float("algorithm:tolerance", 0.0).unwrap();
    defaults
        .set_section_description("algorithm", "Search algorithm settings")
        .unwrap();
    defaults
}

#[test]
fn test_configure_and_check_lifecycle() {
    let defaults = tool_defaults();

    // A user configuration seeded from the defaults, then edited.
    let mut config = ParamTree::new();
    config.set_defaults(&defaults, "");
    config.set_value("threads", 8i64, "Number of worker threads");
    config.set_value("algorithm:mode", "thorough", "Search mode");

    assert!(config.check_defaults("mytool", &defaults, "").is_empty());

    // An edit violating a restriction and a typo both surface as warnings.
    config.set_value("threads", 0i64, "");
    config.set_value("algorithm:modee", "fast", "");
    let warnings = config.check_defaults("mytool", &defaults, "");
    assert_eq!(warnings.len(), 2);
    assert!(warnings.iter().any(|w| matches!(
        w,
        DefaultsWarning::InvalidValue { path, .. } if path == "threads"
    )));
    assert!(warnings.iter().any(|w| matches!(
        w,
        DefaultsWarning::UnknownParameter { path, .. } if path == "algorithm:modee"
    )));
}

#[test]
fn test_defaults_evolution_via_update() {
    // The shipped tool evolves: tolerance became an int list, a new knob
    // appeared, an old one disappeared.
    let mut new_defaults = ParamTree::new();
    new_defaults.set_value("version", "2.0", "");
    new_defaults.set_value("threads", 1i64, "");
    new_defaults.set_value("algorithm:tolerance", vec![1i64, 2], "");
    new_defaults.set_value("algorithm:window", 5i64, "");

    let mut user_config = ParamTree::new();
    user_config.set_value("version", "1.0", "");
    user_config.set_value("threads", 16i64, "");
    user_config.set_value("algorithm:tolerance", 0.5, "");
    user_config.set_value("algorithm:legacy", 1i64, "");

    let report = new_defaults.update(&user_config);

    // Reserved: version stays at the new value.
    assert_eq!(*new_defaults.get_value("version").unwrap(), "2.0");
    // Same kind: the user's value is adopted.
    assert_eq!(*new_defaults.get_value("threads").unwrap(), 16i64);
    // Kind changed: the new default wins.
    assert_eq!(
        new_defaults.get_value("algorithm:tolerance").unwrap().kind(),
        ValueKind::IntList
    );
    // Unique to the new defaults: kept. Unique to the user: dropped.
    assert!(new_defaults.exists("algorithm:window"));
    assert!(!new_defaults.exists("algorithm:legacy"));

    assert_eq!(report.adopted, 1);
    assert_eq!(report.kept_reserved, 1);
    assert_eq!(report.kind_mismatches, 1);
    assert_eq!(report.dropped, 1);
}

#[test]
fn test_update_with_custom_reserved_table_protects_io_paths() {
    let mut new_defaults = ParamTree::new();
    new_defaults.set_value("io:out_dir", "/tmp/new", "");

    let mut old = ParamTree::new();
    old.set_value("io:out_dir", "/home/user/results", "");

    let reserved = ReservedPaths::new(["io:*"]);
    new_defaults.update_with(&old, &reserved);
    assert_eq!(*new_defaults.get_value("io:out_dir").unwrap(), "/tmp/new");
}

#[test]
fn test_subtree_copy_feeds_a_nested_tool() {
    let mut pipeline = ParamTree::new();
    pipeline.set_value("stage1:peak:height", 2.0, "Minimum peak height");
    pipeline.set_value("stage1:peak:width", 0.1, "Expected peak width");
    pipeline.set_value("stage2:other", 1i64, "");
    pipeline
        .set_section_description("stage1:peak", "Peak model")
        .unwrap();

    // Hand the nested tool only its own parameters, prefix stripped.
    let peak_params = pipeline.copy_subtree("stage1:peak", false);
    assert_eq!(peak_params.size(), 2);
    assert_eq!(*peak_params.get_value("height").unwrap(), 2.0);

    // Merge edited results back under the original prefix.
    let mut edited = peak_params;
    edited.set_value("height", 3.5, "Minimum peak height");
    pipeline.insert("stage1:peak", &edited);
    assert_eq!(*pipeline.get_value("stage1:peak:height").unwrap(), 3.5);
    assert_eq!(
        pipeline.get_section_description("stage1:peak").unwrap(),
        "Peak model"
    );
}

#[test]
fn test_iterator_trace_reconstructs_nesting_for_an_encoder() {
    let mut tree = ParamTree::new();
    tree.set_value("a", 1i64, "");
    tree.set_value("r:s:b", 2i64, "");
    tree.set_value("r:s:c", 3i64, "");
    tree.set_value("t:d", 4i64, "");

    // Emit an indented listing the way a format encoder would, using only
    // the trace; depth must never go negative and must end balanced.
    let mut depth = 0usize;
    let mut lines = Vec::new();
    let mut iter = tree.iter();
    for visited in iter.by_ref() {
        for event in &visited.trace {
            match event.action {
                TraceAction::Opened => {
                    lines.push(format!("{}<{}>", "  ".repeat(depth), event.name));
                    depth += 1;
                }
                TraceAction::Closed => {
                    depth -= 1;
                    lines.push(format!("{}</{}>", "  ".repeat(depth), event.name));
                }
            }
        }
        lines.push(format!(
            "{}{}={}",
            "  ".repeat(depth),
            visited.entry.name,
            visited.entry.value
        ));
    }
    for event in iter.closing_trace() {
        assert_eq!(event.action, TraceAction::Closed);
        depth -= 1;
        lines.push(format!("{}</{}>", "  ".repeat(depth), event.name));
    }

    assert_eq!(depth, 0);
    assert_eq!(
        lines,
        [
            "a=1",
            "<r>",
            "  <s>",
            "    b=2",
            "    c=3",
            "  </s>",
            "</r>",
            "<t>",
            "  d=4",
            "</t>",
        ]
    );
}

#[test]
fn test_json_round_trip_preserves_structure_and_metadata() {
    let mut tree = tool_defaults();
    tree.set_value_tagged("io:in", "input.raw", "Input file", &["input file", "required"]);
    tree.set_value("lists:ints", vec![1i64, 2, 3], "");
    tree.set_value("lists:doubles", vec![0.5, 1.5], "");
    tree.set_value("flags:empty", Value::Empty, "Unset leaf");

    let json = serde_json::to_string_pretty(&tree).unwrap();
    let restored: ParamTree = serde_json::from_str(&json).unwrap();

    assert_eq!(restored, tree);
    // Restrictions are not part of equality; check one explicitly.
    assert_eq!(
        restored.get_entry("threads").unwrap().restriction,
        tree.get_entry("threads").unwrap().restriction
    );
    assert_eq!(
        restored.get_section_description("algorithm").unwrap(),
        "Search algorithm settings"
    );
}

#[test]
fn test_command_line_feeds_defaults_check() {
    let rules = FlagRules::new()
        .one_value("-threads", "threads")
        .one_value("-mode", "algorithm:mode");

    let mut config = ParamTree::new();
    config.parse_command_line_classified(["exe", "-threads", "8", "-mode", "sloppy"], &rules);

    // Command line values are strings; both flagged against typed defaults.
    let warnings = config.check_defaults("mytool", &tool_defaults(), "");
    assert_eq!(warnings.len(), 2);
    assert!(warnings.iter().any(|w| matches!(
        w,
        DefaultsWarning::WrongType { path, .. } if path == "threads"
    )));
    assert!(warnings.iter().any(|w| matches!(
        w,
        DefaultsWarning::InvalidValue { path, .. } if path == "algorithm:mode"
    )));
}

#[test]
fn test_tool_info_travels_beside_the_tree() {
    let mut info = ToolInfo::new("peak-picker", "2.1.0");
    info.docurl = Some("https://example.org/docs/peak-picker".to_string());
    info.citations.push("doi:10.1000/example".to_string());

    let json = serde_json::to_string(&info).unwrap();
    let restored: ToolInfo = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, info);
}

#[test]
fn test_trees_built_in_different_orders_are_equal() {
    let defaults = tool_defaults();

    let mut reordered = ParamTree::new();
    reordered.set_value("algorithm:tolerance", 0.5, "Match tolerance");
    reordered.set_value("algorithm:mode", "fast", "Search mode");
    reordered
        .set_section_description("algorithm", "Search algorithm settings")
        .unwrap();
    reordered.set_value("threads", 1i64, "Number of worker threads");
    reordered.set_value("version", "2.0", "Tool version");

    assert_eq!(defaults, reordered);
}
