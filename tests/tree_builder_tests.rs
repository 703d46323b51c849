mod common;

use pretty_assertions::assert_eq;
use virmap_stats::aggregator::{build_timing_tree, simple_timing_info, StageLookup};
use virmap_stats::parser::RunContext;
use virmap_stats::utils::config::INCOMPLETE_ROOT_NAME;

#[test]
fn test_complete_run_tree() {
    let temp = tempfile::tempdir().unwrap();
    let ctx = RunContext::discover(common::complete_run(temp.path())).unwrap();

    let tree = build_timing_tree(&ctx).unwrap();

    assert_eq!(tree.name(), "Overall Virmap time");
    assert_eq!(tree.elapsed(), Some(400.0));
    assert_eq!(tree.cpu_ratio(), Some(5.0));

    let stages: Vec<&str> = tree.children().iter().map(|c| c.name()).collect();
    assert_eq!(
        stages,
        vec![
            "decompress",
            "bbmap to virus",
            "diamond to virus",
            "iterative improvement",
            "diamond full",
        ]
    );
}

#[test]
fn test_sub_root_takes_total() {
    let temp = tempfile::tempdir().unwrap();
    let ctx = RunContext::discover(common::complete_run(temp.path())).unwrap();
    let tree = build_timing_tree(&ctx).unwrap();

    let bbmap = tree.child("bbmap to virus").unwrap();
    assert_eq!(bbmap.children().len(), 1);
    let sub_root = &bbmap.children()[0];
    assert_eq!(sub_root.name(), "Total time");
    assert_eq!(sub_root.elapsed(), Some(28.0));
    let steps: Vec<&str> = sub_root.children().iter().map(|c| c.name()).collect();
    assert_eq!(steps, vec!["Loading index", "Mapping"]);

    let bss = &tree.child("diamond to virus").unwrap().children()[0];
    assert_eq!(bss.name(), "Total time");
    assert_eq!(bss.elapsed(), Some(35.0));
    assert_eq!(bss.child("Blasting").unwrap().elapsed(), Some(30.25));
}

#[test]
fn test_direct_attachment() {
    let temp = tempfile::tempdir().unwrap();
    let ctx = RunContext::discover(common::complete_run(temp.path())).unwrap();
    let tree = build_timing_tree(&ctx).unwrap();

    let improve = tree.child("iterative improvement").unwrap();
    let cycle_1 = improve.child("Cycle 1").unwrap();
    assert_eq!(cycle_1.elapsed(), Some(90.0));
    assert_eq!(cycle_1.children().len(), 1);
    assert_eq!(cycle_1.children()[0].name(), "THREADING took");
    assert_eq!(improve.child("Cycle 2").unwrap().elapsed(), Some(100.0));

    // grand total of diamond full does not rename the stage
    let diamond_full = tree.child("diamond full").unwrap();
    assert_eq!(diamond_full.elapsed(), Some(50.0));
    let steps: Vec<&str> = diamond_full.children().iter().map(|c| c.name()).collect();
    assert_eq!(steps, vec!["Reading queries"]);
}

#[test]
fn test_killed_run_uses_scheduler_walltime() {
    let temp = tempfile::tempdir().unwrap();
    let ctx = RunContext::discover(common::killed_run(temp.path())).unwrap();

    let tree = build_timing_tree(&ctx).unwrap();

    assert_eq!(tree.name(), INCOMPLETE_ROOT_NAME);
    assert_eq!(tree.elapsed(), Some(3723.0));
    // missing .bbmap.err leaves the stage bare
    let bbmap = tree.child("bbmap to virus").unwrap();
    assert_eq!(bbmap.elapsed(), Some(12.0));
    assert!(bbmap.children().is_empty());
}

#[test]
fn test_no_overall_no_scheduler_stays_timeless() {
    let temp = tempfile::tempdir().unwrap();
    let run = common::killed_run(temp.path());
    std::fs::remove_file(temp.path().join("sample_2.log")).unwrap();
    let ctx = RunContext::discover(run).unwrap();

    let tree = build_timing_tree(&ctx).unwrap();

    assert_eq!(tree.name(), "root");
    assert_eq!(tree.elapsed(), None);
    assert_eq!(tree.children().len(), 2);
}

#[test]
fn test_flat_timings_aligned() {
    let temp = tempfile::tempdir().unwrap();
    let ctx = RunContext::discover(common::complete_run(temp.path())).unwrap();

    let timings = simple_timing_info(&ctx, StageLookup::new(true)).unwrap();

    assert_eq!(timings.walltime_of("decompress"), Some(10.0));
    assert_eq!(timings.walltime_of("normalize"), None);
    assert_eq!(timings.walltime_of("Overall Virmap time"), Some(400.0));
    assert_eq!(timings.cpu_ratios[3], Some(8.0));
}

#[test]
fn test_unreadable_sub_log_leaves_stage_bare() {
    let temp = tempfile::tempdir().unwrap();
    let run = common::complete_run(temp.path());
    let bbmap_err = run.join("S1.bbmap.err");
    std::fs::remove_file(&bbmap_err).unwrap();
    std::fs::create_dir(&bbmap_err).unwrap();
    let ctx = RunContext::discover(run).unwrap();

    let tree = build_timing_tree(&ctx).unwrap();

    assert_eq!(tree.name(), "Overall Virmap time");
    let bbmap = tree.child("bbmap to virus").unwrap();
    assert_eq!(bbmap.elapsed(), Some(30.0));
    assert!(bbmap.children().is_empty());
    assert_eq!(tree.children().len(), 5);
    assert_eq!(
        tree.child("diamond to virus").unwrap().children()[0].name(),
        "Total time"
    );
}
