//! NCBI taxonomy dump loading and lineage resolution.
//!
//! Reads `merged.dmp`, `nodes.dmp` and `names.dmp` from a taxdump
//! directory. Fields are separated by `\t|\t` and lines end in `\t|`.
//!
//! The database is built once and is read-only afterwards, so a single
//! instance can be shared by reference across any number of runs.

use crate::utils::config::TAXONOMY_ROOT_ID;
use crate::utils::error::TaxonomyError;
use log::info;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::Instant;

pub type ParentMap = HashMap<u32, u32>;
pub type NameMap = HashMap<u32, String>;

/// Parent and scientific name of every tax id, merged ids included
#[derive(Debug, Clone, Default)]
pub struct TaxonomyDb {
    parents: ParentMap,
    names: NameMap,
}

impl TaxonomyDb {
    /// Load a taxdump directory
    ///
    /// # Errors
    /// * `TaxonomyError::ReadFailed` - a dump file is missing or unreadable
    /// * `TaxonomyError::MalformedLine` - a line has too few fields or a bad id
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, TaxonomyError> {
        let dir = dir.as_ref();
        info!("Loading tax tree from {}", dir.display());
        let start = Instant::now();

        let db = Self::from_readers(
            open(&dir.join("merged.dmp"))?,
            open(&dir.join("nodes.dmp"))?,
            open(&dir.join("names.dmp"))?,
        )?;

        info!(
            "Finished loading tax tree ({} ids) in {:.2}s",
            db.len(),
            start.elapsed().as_secs_f64()
        );

        Ok(db)
    }

    /// Build the database from the three dump streams
    pub fn from_readers(
        merged: impl BufRead,
        nodes: impl BufRead,
        names: impl BufRead,
    ) -> Result<Self, TaxonomyError> {
        // new id -> ids merged into it
        let mut merged_into: HashMap<u32, Vec<u32>> = HashMap::new();
        for_each_row(merged, "merged.dmp", 2, |fields, line| {
            let old_id = parse_id(fields[0], "merged.dmp", line)?;
            let new_id = parse_id(fields[1], "merged.dmp", line)?;
            merged_into.entry(new_id).or_default().push(old_id);
            Ok(())
        })?;

        let mut db = Self::default();

        for_each_row(nodes, "nodes.dmp", 2, |fields, line| {
            let id = parse_id(fields[0], "nodes.dmp", line)?;
            let parent = parse_id(fields[1], "nodes.dmp", line)?;
            db.parents.insert(id, parent);
            for old_id in merged_into.get(&id).into_iter().flatten() {
                db.parents.insert(*old_id, parent);
            }
            Ok(())
        })?;

        for_each_row(names, "names.dmp", 4, |fields, line| {
            if fields[3] != "scientific name" {
                return Ok(());
            }
            let id = parse_id(fields[0], "names.dmp", line)?;
            let name = fields[1].to_string();
            for old_id in merged_into.get(&id).into_iter().flatten() {
                db.names.insert(*old_id, name.clone());
            }
            db.names.insert(id, name);
            Ok(())
        })?;

        Ok(db)
    }

    /// Number of tax ids with a known parent
    pub fn len(&self) -> usize {
        self.parents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }

    /// Scientific name of a tax id
    pub fn name(&self, tax_id: u32) -> Option<&str> {
        self.names.get(&tax_id).map(String::as_str)
    }

    /// Lineage of `tax_id` from the top of the tree down to the id itself,
    /// excluding the universal root
    ///
    /// # Errors
    /// * `TaxonomyError::UnknownTaxId` - the id, or an ancestor, is not in the dump
    /// * `TaxonomyError::LineageCycle` - the parent chain never reaches the root
    pub fn resolve(&self, tax_id: u32) -> Result<Vec<String>, TaxonomyError> {
        let mut lineage = Vec::new();
        let mut current = tax_id;

        while current != TAXONOMY_ROOT_ID {
            if lineage.len() > self.parents.len() {
                return Err(TaxonomyError::LineageCycle(tax_id));
            }
            let name = self
                .names
                .get(&current)
                .ok_or(TaxonomyError::UnknownTaxId(current))?;
            lineage.push(name.clone());
            current = *self
                .parents
                .get(&current)
                .ok_or(TaxonomyError::UnknownTaxId(current))?;
        }

        lineage.reverse();
        Ok(lineage)
    }
}

fn open(path: &Path) -> Result<BufReader<File>, TaxonomyError> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| TaxonomyError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })
}

/// Split each dump line into fields and hand them to `handle`
fn for_each_row<R, F>(reader: R, file: &str, min_fields: usize, mut handle: F) -> Result<(), TaxonomyError>
where
    R: BufRead,
    F: FnMut(&[&str], usize) -> Result<(), TaxonomyError>,
{
    for (index, line) in reader.lines().enumerate() {
        let line_no = index + 1;
        let line = line.map_err(|source| TaxonomyError::ReadFailed {
            path: file.into(),
            source,
        })?;
        if line.trim().is_empty() {
            continue;
        }

        let line = line.strip_suffix("\t|").unwrap_or(&line);
        let fields: Vec<&str> = line.split("\t|\t").collect();
        if fields.len() < min_fields {
            return Err(TaxonomyError::MalformedLine {
                file: file.to_string(),
                line: line_no,
                reason: format!("expected {} fields, found {}", min_fields, fields.len()),
            });
        }

        handle(&fields, line_no)?;
    }

    Ok(())
}

fn parse_id(field: &str, file: &str, line: usize) -> Result<u32, TaxonomyError> {
    field
        .trim()
        .parse()
        .map_err(|_| TaxonomyError::MalformedLine {
            file: file.to_string(),
            line,
            reason: format!("invalid tax id {:?}", field),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const NODES: &str = "\
1\t|\t1\t|\tno rank\t|
10239\t|\t1\t|\tsuperkingdom\t|
2559587\t|\t10239\t|\tclade\t|
11308\t|\t2559587\t|\tfamily\t|
";
    const NAMES: &str = "\
1\t|\troot\t|\t\t|\tscientific name\t|
10239\t|\tViruses\t|\t\t|\tscientific name\t|
10239\t|\tVira\t|\t\t|\tsynonym\t|
2559587\t|\tRiboviria\t|\t\t|\tscientific name\t|
11308\t|\tOrthomyxoviridae\t|\t\t|\tscientific name\t|
";
    const MERGED: &str = "99999\t|\t11308\t|\n";

    fn db() -> TaxonomyDb {
        TaxonomyDb::from_readers(MERGED.as_bytes(), NODES.as_bytes(), NAMES.as_bytes()).unwrap()
    }

    #[test]
    fn test_resolve_lineage() {
        assert_eq!(
            db().resolve(11308).unwrap(),
            vec!["Viruses", "Riboviria", "Orthomyxoviridae"]
        );
    }

    #[test]
    fn test_merged_id_resolves_like_replacement() {
        assert_eq!(db().resolve(99999).unwrap(), db().resolve(11308).unwrap());
    }

    #[test]
    fn test_synonyms_ignored() {
        assert_eq!(db().name(10239), Some("Viruses"));
    }

    #[test]
    fn test_root_has_empty_lineage() {
        assert!(db().resolve(1).unwrap().is_empty());
    }

    #[test]
    fn test_unknown_id() {
        assert!(matches!(
            db().resolve(424242),
            Err(TaxonomyError::UnknownTaxId(424242))
        ));
    }

    #[test]
    fn test_cycle_detected() {
        let nodes = "5\t|\t6\t|\tx\t|\n6\t|\t5\t|\tx\t|\n";
        let names = "5\t|\ta\t|\t\t|\tscientific name\t|\n6\t|\tb\t|\t\t|\tscientific name\t|\n";
        let db = TaxonomyDb::from_readers("".as_bytes(), nodes.as_bytes(), names.as_bytes()).unwrap();

        assert!(matches!(db.resolve(5), Err(TaxonomyError::LineageCycle(5))));
    }

    #[test]
    fn test_malformed_line() {
        let result = TaxonomyDb::from_readers("".as_bytes(), "abc\t|\t1\t|\n".as_bytes(), "".as_bytes());
        assert!(matches!(result, Err(TaxonomyError::MalformedLine { line: 1, .. })));
    }
}
