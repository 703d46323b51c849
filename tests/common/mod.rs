//! On-disk fixtures shaped like a VirMap samples directory.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

pub const PRIMARY_LOG: &str = "\
Virmap starting
TIME S1 decompress: 10 seconds, 20 CPU seconds, 2 CPU ratio
TIME S1 bbmap to virus: 30 seconds, 240 CPU seconds, 8 CPU ratio
TIME S1 diamond to virus: 40 seconds, 400 CPU seconds, 10 CPU ratio
TIME S1 iterative improvement: 200 seconds, 800 CPU seconds, 4 CPU ratio
TIME S1 diamond full: 50 seconds, 500 CPU seconds, 10 CPU ratio
TIME S1 Overall Virmap time: 400 seconds, 2000 CPU seconds, 5 CPU ratio
";

pub const BBMAP_ERR: &str = "\
Loading index: 3.5 seconds
Mapping: 20 seconds
Total time: 28 seconds
";

pub const SUPER_SCAFFOLDS_ERR: &str = "\
Opening the database...  [0.5s]
Blasting...  [30.25s]
Total time = 35s
";

pub const ITERATE_IMPROVE_ERR: &str = "\
Cycle 1 started
x: 5 seconds
THREADING took: 2 seconds
90 seconds for cycle 1
Cycle 2 started
Overall pileup time: 7 seconds
100 seconds for cycle 2
";

pub const DIAMOND_BLASTX_ERR: &str = "\
Reading queries...  [1s]
Total time = 45s
";

pub const FINAL_FA: &str = "\
>taxId=11308;weak=1;size=120
ACGTACGT
>taxId=10239;size=30
ACGT
";

pub const NODES_DMP: &str = "\
1\t|\t1\t|\tno rank\t|
10239\t|\t1\t|\tsuperkingdom\t|
11308\t|\t10239\t|\tfamily\t|
";

pub const NAMES_DMP: &str = "\
1\t|\troot\t|\t\t|\tscientific name\t|
10239\t|\tViruses\t|\t\t|\tscientific name\t|
11308\t|\tOrthomyxoviridae\t|\t\t|\tscientific name\t|
";

pub fn write(path: impl AsRef<Path>, content: &str) {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

/// A complete run `<parent>/sample_1` with short name `S1`
pub fn complete_run(parent: &Path) -> PathBuf {
    let run = parent.join("sample_1");
    let tmp = parent.join("sample_1_tmp");

    write(run.join("S1.log"), PRIMARY_LOG);
    write(run.join("S1.bbmap.err"), BBMAP_ERR);
    write(run.join("S1.diamondBlastx.err"), DIAMOND_BLASTX_ERR);
    write(run.join("S1.final.fa"), FINAL_FA);
    write(tmp.join("S1.buildSuperScaffolds.err"), SUPER_SCAFFOLDS_ERR);
    write(tmp.join("S1.iterateImprove.err"), ITERATE_IMPROVE_ERR);
    write(
        tmp.join("S1.megahit.err"),
        "Use of uninitialized value $nextLine in split at /virmap/Virmap.pl line 1857, <GEN1> line 2.\nBroken pipe\n",
    );
    write(
        parent.join("sample_1.log"),
        "Walltime Used: 00:10:00\n/bin/sh: line 1: 99 Killed megahit\n",
    );

    run
}

/// A run `<parent>/sample_2` killed after bbmap, without sub-logs or outputs
pub fn killed_run(parent: &Path) -> PathBuf {
    let run = parent.join("sample_2");

    write(
        run.join("S2.log"),
        "TIME S2 decompress: 5 seconds, 5 CPU seconds, 1 CPU ratio\n\
         TIME S2 bbmap to virus: 12 seconds, 48 CPU seconds, 4 CPU ratio\n",
    );
    write(parent.join("sample_2.log"), "Walltime Used: 01:02:03\n");

    run
}

/// A minimal taxdump directory
pub fn taxdump(parent: &Path) -> PathBuf {
    let dir = parent.join("taxdump");

    write(dir.join("nodes.dmp"), NODES_DMP);
    write(dir.join("names.dmp"), NAMES_DMP);
    write(dir.join("merged.dmp"), "");

    dir
}
