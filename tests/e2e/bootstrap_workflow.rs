use skill_sync::sync::{DriftKind, SyncEngine, SyncMode};
use skill_sync::test_utils::fixtures::SkillWorkspace;

const GENERATED: &str = "---\nname: legacy\ndescription: Hand written\n---\n\n# Legacy\n\n<source_of_truth>\nThe docs folder.\n</source_of_truth>\n\n<context_policy>\nRead before writing.\n</context_policy>\n\n<delivery_rule>\nShip small.\nKeep under 50 words.\n</delivery_rule>\n\n<output_format>\nMarkdown.\n</output_format>\n\n## Steps\n\n1. Do the thing.\n";

#[test]
fn test_bootstrap_recovers_source_with_marker_after_anchor() {
    let ws = SkillWorkspace::standard();
    let generated = ws.write_skill_generated("legacy", GENERATED);
    ws.map_skill("legacy", "concise");
    let config = ws.config();
    let engine = SyncEngine::new(ws.root(), &config);

    let check = engine.run(SyncMode::Check).unwrap();
    assert_eq!(check.out_of_sync.len(), 1);
    assert_eq!(check.out_of_sync[0].kind, DriftKind::MissingSource);
    assert!(!ws.skill_source("legacy").exists());

    let fix = engine.run(SyncMode::Fix).unwrap();
    assert_eq!(fix.bootstrapped, vec![ws.skill_source("legacy")]);
    assert!(fix.changed.is_empty(), "{:?}", fix.changed);

    assert_eq!(
        ws.read(&ws.skill_source("legacy")),
        "---\nname: legacy\ndescription: Hand written\n---\n\n# Legacy\n\n<source_of_truth>\nThe docs folder.\n</source_of_truth>\n\n{{COMMON_BLOCKS}}\n\n## Steps\n\n1. Do the thing.\n"
    );
    assert_eq!(ws.read(&generated), GENERATED);
    assert!(engine.run(SyncMode::Check).unwrap().is_clean());
}

#[test]
fn test_bootstrap_repairs_inline_frontmatter_close() {
    let ws = SkillWorkspace::standard();
    ws.write_skill_generated("legacy", "---\nname: legacy ---\n# Legacy\n");
    ws.map_skill("legacy", "concise");
    let config = ws.config();
    let engine = SyncEngine::new(ws.root(), &config);

    let fix = engine.run(SyncMode::Fix).unwrap();
    assert!(fix.errors.is_empty(), "{:?}", fix.errors);
    assert_eq!(
        ws.read(&ws.skill_source("legacy")),
        "---\nname: legacy\n---\n# Legacy\n\n{{COMMON_BLOCKS}}\n"
    );
    let generated = ws.read(&ws.skill_generated("legacy"));
    assert!(generated.starts_with("---\nname: legacy\n---\n# Legacy\n\n<context_policy>"));
    assert!(engine.run(SyncMode::Check).unwrap().is_clean());
}

#[test]
fn test_generated_without_frontmatter_is_skill_error() {
    let ws = SkillWorkspace::standard();
    ws.write_skill_generated("legacy", "# Legacy\n");
    ws.map_skill("legacy", "concise");
    let config = ws.config();

    let fix = SyncEngine::new(ws.root(), &config).run(SyncMode::Fix).unwrap();
    assert_eq!(fix.errors.len(), 1);
    assert!(fix.errors[0].message.contains("malformed frontmatter"));
    assert!(!ws.skill_source("legacy").exists());
}
