use skill_sync::SyncError;
use skill_sync::sync::{DriftKind, SyncEngine, SyncMode};
use skill_sync::test_utils::fixtures::SkillWorkspace;

#[test]
fn test_marker_only_source_renders_delta_scenario() {
    let ws = SkillWorkspace::standard();
    ws.write_skill_source("alpha", "---\nname: alpha\n---\n{{COMMON_BLOCKS}}\n");
    ws.map_skill("alpha", "concise");
    let config = ws.config();

    let report = SyncEngine::new(ws.root(), &config).run(SyncMode::Fix).unwrap();
    assert!(report.errors.is_empty(), "{:?}", report.errors);

    let generated = ws.read(&ws.skill_generated("alpha"));
    assert_eq!(
        generated,
        "---\nname: alpha\n---\n\n\
         <context_policy>\nRead before writing.\n</context_policy>\n\n\
         <delivery_rule>\nShip small.\nKeep under 50 words.\n</delivery_rule>\n\n\
         <output_format>\nMarkdown.\n</output_format>\n"
    );
}

#[test]
fn test_profiles_resolved_per_skill() {
    let ws = SkillWorkspace::standard();
    ws.write_profile(
        "verbose",
        "<output_format>\nLong prose.\n</output_format>\n",
    );
    for (skill, profile) in [("alpha", "concise"), ("beta", "verbose"), ("gamma", "concise")] {
        ws.write_skill_source(skill, &format!("---\nname: {skill}\n---\n\n{{{{COMMON_BLOCKS}}}}\n"));
        ws.map_skill(skill, profile);
    }
    let config = ws.config();

    let report = SyncEngine::new(ws.root(), &config).run(SyncMode::Fix).unwrap();
    assert_eq!(report.changed.len(), 3);
    assert_eq!(report.profiles.len(), 2);

    let beta = ws.read(&ws.skill_generated("beta"));
    assert!(beta.contains("<output_format>\nLong prose.\n</output_format>"));
    assert!(beta.contains("<delivery_rule>\nShip small.\n</delivery_rule>"));
    let gamma = ws.read(&ws.skill_generated("gamma"));
    assert!(gamma.contains("Keep under 50 words."));
}

#[test]
fn test_canonical_edit_propagates_on_fix() {
    let ws = SkillWorkspace::standard();
    ws.write_skill_source("alpha", "---\nname: alpha\n---\n\n{{COMMON_BLOCKS}}\n");
    ws.map_skill("alpha", "concise");
    let config = ws.config();
    let engine = SyncEngine::new(ws.root(), &config);
    engine.run(SyncMode::Fix).unwrap();

    std::fs::write(
        ws.canonical_path(),
        "<context_policy>\nRead twice.\n</context_policy>\n",
    )
    .unwrap();

    let check = engine.run(SyncMode::Check).unwrap();
    assert_eq!(check.out_of_sync.len(), 1);
    assert_eq!(check.out_of_sync[0].kind, DriftKind::OutOfSync);

    engine.run(SyncMode::Fix).unwrap();
    assert!(ws.read(&ws.skill_generated("alpha")).contains("Read twice."));
    assert!(engine.run(SyncMode::Check).unwrap().is_clean());
}

#[test]
fn test_incomplete_mapping_writes_nothing() {
    let ws = SkillWorkspace::standard();
    ws.write_skill_source("alpha", "---\nname: alpha\n---\n\n{{COMMON_BLOCKS}}\n");
    ws.write_skill_source("beta", "---\nname: beta\n---\n\n{{COMMON_BLOCKS}}\n");
    ws.map_skill("alpha", "concise");
    ws.map_skill("beta", "missing");
    let config = ws.config();

    let err = SyncEngine::new(ws.root(), &config).run(SyncMode::Fix).unwrap_err();
    let SyncError::Configuration(errors) = err else {
        panic!("expected configuration error");
    };
    assert_eq!(errors.len(), 1);
    assert!(errors[0].starts_with("unknown profile 'missing' for skill 'beta'"));
    assert!(!ws.skill_generated("alpha").exists());
}

#[test]
fn test_per_skill_error_does_not_stop_other_skills() {
    let ws = SkillWorkspace::standard();
    ws.write_skill_source("alpha", "---\nname: alpha\n---\n\nNo marker here.\n");
    ws.write_skill_source("beta", "---\nname: beta\n---\n\n{{COMMON_BLOCKS}}\n");
    ws.map_skill("alpha", "concise");
    ws.map_skill("beta", "concise");
    let config = ws.config();

    let report = SyncEngine::new(ws.root(), &config).run(SyncMode::Fix).unwrap();
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].skill, "alpha");
    assert!(ws.skill_generated("beta").exists());
    assert!(!ws.skill_generated("alpha").exists());
}

#[test]
fn test_source_normalized_on_fix() {
    let ws = SkillWorkspace::standard();
    let source = ws.write_skill_source(
        "alpha",
        "\u{feff}---\r\nname: alpha\r\n---\r\n\r\n\r\n\r\n# Alpha\r\n   {{COMMON_BLOCKS}}   \r\nTail",
    );
    ws.map_skill("alpha", "concise");
    let config = ws.config();
    let engine = SyncEngine::new(ws.root(), &config);

    let check = engine.run(SyncMode::Check).unwrap();
    assert!(
        check
            .out_of_sync
            .iter()
            .any(|drift| drift.kind == DriftKind::SourceNeedsNormalization)
    );

    let fix = engine.run(SyncMode::Fix).unwrap();
    assert!(fix.changed.contains(&source));
    assert_eq!(
        ws.read(&source),
        "---\nname: alpha\n---\n\n# Alpha\n\n{{COMMON_BLOCKS}}\n\nTail\n"
    );
    assert!(engine.run(SyncMode::Check).unwrap().is_clean());
}
