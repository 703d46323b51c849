//! Configuration and constants for the CLI.
//!
//! Everything here is tied to the output conventions of one VirMap
//! release and the sub-tools it wraps.

/// Current aggregate report schema version
pub const REPORT_SCHEMA_VERSION: &str = "1.0.0";

/// Canonical top-level stage names, in report column order
pub const TIME_CATEGORIES: [&str; 19] = [
    "decompress",
    "dereplicate",
    "normalize",
    "bbmap to virus",
    "diamond to virus",
    "construct superscaffolds",
    "megahit assembly",
    "tadpole assembly",
    "dedupe assembly",
    "merge assembly",
    "diamond filter map",
    "blastn filter map",
    "filter contigs",
    "iterative improvement",
    "self align and quantify",
    "blastn full",
    "diamond full",
    "determine taxonomy",
    "Overall Virmap time",
];

/// Root name used when only the scheduler walltime could be recovered
pub const INCOMPLETE_ROOT_NAME: &str = "root - DID NOT COMPLETE";

/// Timings kept as children of an iterative improvement cycle
pub const CYCLE_KEPT_TIMINGS: &[&str] = &[
    "finished reading SAM after",
    "Total time",
    "THREADING took",
    "Overall pileup time",
];

/// Sequence flags VirMap attaches to final output records (sorted)
pub const VIRMAP_TAX_FLAGS: &[&str] = &[
    "HighOthers",
    "highDivergence",
    "highUnknownInformation",
    "merged",
    "potentialMisannotations",
    "weak",
];

/// NCBI taxonomy id of the "Viruses" superkingdom
pub const VIRUSES_TAX_ID: u32 = 10239;

/// Root of the NCBI taxonomy tree
pub const TAXONOMY_ROOT_ID: u32 = 1;

/// Benign error count seen on a healthy run
pub const EXPECTED_BENIGN_ERRORS: usize = 15;

/// Bytes read from a candidate scheduler log while looking for its header
pub const SCHEDULER_HEADER_BYTES: u64 = 8192;

/// Extensions of files scanned for warnings and errors
pub const COLLECTED_LOG_EXTENSIONS: &[&str] = &["err", "txt", "log"];

/// Messages emitted by `die` calls in the VirMap perl scripts
pub const PERL_DIE_MSGS: &[&str] = &[
    "Could not open file",
    "no acc on",
    "no acc on after",
    "can't open DB",
    "what?",
    "Could not close file",
    "pad is not a number",
    "casemask is empty",
    "has no parent, line =",
    "no position information in",
    "can't strip end info off  no ;codonStart=",
    "has no coordinates",
    "can't grab position information on",
    "no valid position information",
    "can't get taxId on reference",
    "double double reverse reverse bug",
    "isn't in sizes",
    "sem failed:",
];

/// Warnings from perl and the wrapped tools worth surfacing
pub const PERL_WARNINGS: &[&str] = &[
    "Perl exited with active threads",
    "Use of uninitialized value",
    "Exception in thread",
    "isn't numeric in numeric",
    "FAlite: Empty",
    "BLAST Database error",
    "Error open",
    "exceeded memory allocation",
    "Killed",
    "Broken pipe",
    "read failed",
    "write failed",
    "Error detecting",
    "cannot",
];

// Known-harmless warnings, pinned to line numbers in the VirMap perl
// sources. A VirMap upgrade that moves these lines turns them critical.
pub const BENIGN_ERROR_PATTERNS: &[&str] = &[
    r"Use of uninitialized value \$nextLine in split .*? line 1857,",
    r"Use of uninitialized value \$currentHead in substitution .*? line 1859,",
    r"Use of uninitialized value \$currentHead in string .*? line 1865,",
    r"Use of uninitialized value \$currentHead in string .*? line 1866,",
    r"Use of uninitialized value \$currentHead in string .*? line 1873,",
    r"Use of uninitialized value \$currentHead in hash .*? line 1876,",
    r"Use of uninitialized value \$head in string .*? line 1900,",
    r"Use of uninitialized value \$sem in concatenation \(\.\) or string at .*? line 395\.",
];

/// Literal marking a process killed by the OOM killer or scheduler
pub const KILLED_MARKER: &str = "Killed";
