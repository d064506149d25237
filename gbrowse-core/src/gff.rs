//! GFF3 feature loading
//!
//! Reads a GFF3 file (optionally gzip-compressed) into an [`InMemoryDatabase`].
//! `##sequence-region` pragmas become `Sequence` landmarks; every feature is
//! registered under its `Name`, with `ID` and `Alias` values as extra lookup
//! names. The lookup class comes from a `Class` attribute when present and
//! falls back to the feature type.

use crate::database::InMemoryDatabase;
use crate::error::{BrowseError, BrowseResult};
use crate::types::{Position, RawFeature};
use flate2::read::GzDecoder;
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

/// One parsed GFF3 feature line
#[derive(Debug, Clone, PartialEq)]
pub struct GffRecord {
    pub seqname: String,
    pub source: String,
    pub feature_type: String,
    pub start: Position,
    pub end: Position,
    pub attributes: HashMap<String, String>,
}

impl GffRecord {
    /// `type:source` string used for track matching
    pub fn method(&self) -> String {
        if self.source.is_empty() || self.source == "." {
            self.feature_type.clone()
        } else {
            format!("{}:{}", self.feature_type, self.source)
        }
    }

    pub fn get_attribute(&self, key: &str) -> Option<&String> {
        self.attributes.get(key)
    }

    /// Display name: `Name`, then `ID`, then a coordinate-derived fallback
    pub fn display_name(&self) -> String {
        self.get_attribute("Name")
            .or_else(|| self.get_attribute("ID"))
            .cloned()
            .unwrap_or_else(|| format!("{}:{}..{}", self.seqname, self.start, self.end))
    }

    pub fn aliases(&self) -> Vec<&str> {
        let mut aliases: Vec<&str> = Vec::new();
        if let Some(id) = self.get_attribute("ID") {
            aliases.push(id);
        }
        if let Some(alias) = self.get_attribute("Alias") {
            aliases.extend(alias.split(',').map(str::trim).filter(|a| !a.is_empty()));
        }
        aliases
    }
}

pub struct Gff3Reader<R> {
    reader: R,
    source_name: String,
}

impl Gff3Reader<Box<dyn BufRead>> {
    /// Open a GFF3 file; `.gz` files are decompressed on the fly
    pub fn open(path: &Path) -> BrowseResult<Self> {
        let file = File::open(path)?;
        let inner: Box<dyn Read> = if path.extension().map_or(false, |ext| ext == "gz") {
            Box::new(GzDecoder::new(file))
        } else {
            Box::new(file)
        };
        Ok(Self {
            reader: Box::new(BufReader::new(inner)),
            source_name: path.display().to_string(),
        })
    }
}

impl<R: BufRead> Gff3Reader<R> {
    pub fn new(reader: R, source_name: &str) -> Self {
        Self {
            reader,
            source_name: source_name.to_string(),
        }
    }

    /// Load every landmark and feature into an in-memory database
    pub fn read_database(self) -> BrowseResult<InMemoryDatabase> {
        let mut db = InMemoryDatabase::new();
        let mut landmarks: HashSet<String> = HashSet::new();
        let source_name = self.source_name;

        for (line_no, line) in self.reader.lines().enumerate() {
            let line = line?;
            let line = line.trim_end();

            if let Some(pragma) = line.strip_prefix("##sequence-region") {
                let (name, start, end) = parse_sequence_region(pragma)
                    .ok_or_else(|| BrowseError::parse(&source_name, format!("line {}: bad sequence-region", line_no + 1)))?;
                if landmarks.insert(name.clone()) {
                    db.add_landmark_range(name, start, end);
                }
                continue;
            }
            if line.starts_with("##FASTA") {
                break;
            }
            // Skip comments and empty lines
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }

            let record = parse_gff3_line(line)
                .map_err(|message| BrowseError::parse(&source_name, format!("line {}: {}", line_no + 1, message)))?;
            let class = record
                .get_attribute("Class")
                .cloned()
                .unwrap_or_else(|| record.feature_type.clone());
            let mut feature = RawFeature::new(
                record.seqname.clone(),
                record.start,
                record.end,
                record.method(),
                record.display_name(),
            );
            if landmarks.contains(&record.seqname) {
                feature = feature.with_ref_class("Sequence");
            }
            db.add_feature(class, feature, &record.aliases());
        }

        log::info!("Loaded {} records from {}", db.len(), source_name);
        Ok(db)
    }
}

/// Load a GFF3 file into an in-memory database
pub fn load_database(path: &Path) -> BrowseResult<InMemoryDatabase> {
    Gff3Reader::open(path)?.read_database()
}

fn parse_sequence_region(pragma: &str) -> Option<(String, Position, Position)> {
    let fields: Vec<&str> = pragma.split_whitespace().collect();
    if fields.len() != 3 {
        return None;
    }
    let start: Position = fields[1].parse().ok()?;
    let end: Position = fields[2].parse().ok()?;
    if start > end {
        return None;
    }
    Some((fields[0].to_string(), start, end))
}

pub fn parse_gff3_line(line: &str) -> Result<GffRecord, String> {
    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() != 9 {
        return Err(format!("GFF3 line must have 9 fields, got {}", fields.len()));
    }

    let start: Position = fields[3]
        .parse()
        .map_err(|_| format!("invalid start {:?}", fields[3]))?;
    let end: Position = fields[4]
        .parse()
        .map_err(|_| format!("invalid end {:?}", fields[4]))?;

    Ok(GffRecord {
        seqname: fields[0].to_string(),
        source: fields[1].to_string(),
        feature_type: fields[2].to_string(),
        start,
        end,
        attributes: parse_gff3_attributes(fields[8]),
    })
}

fn parse_gff3_attributes(attr_string: &str) -> HashMap<String, String> {
    let mut attributes = HashMap::new();
    for pair in attr_string.split(';') {
        let pair = pair.trim();
        if pair.is_empty() {
            continue;
        }
        if let Some((key, value)) = pair.split_once('=') {
            let value = value.trim();
            let decoded = urlencoding::decode(value)
                .map(|v| v.into_owned())
                .unwrap_or_else(|_| value.to_string());
            attributes.insert(key.trim().to_string(), decoded);
        }
    }
    attributes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::FeatureDatabase;
    use std::io::Cursor;

    const SAMPLE: &str = "##gff-version 3
##sequence-region chrI 1 15072423
chrI\tcurated\tgene\t11641\t16585\t.\t+\t.\tID=gene:WBGene00022276;Name=nlp-40;Alias=Y74C9A.2
chrI\t.\tmatch\t20000\t20400\t.\t-\t.\tName=yk1054h04;Class=EST
chrI\t.\tmatch\t22000\t22500\t.\t-\t.\tName=yk1054h04;Class=EST
chrI\tcurated\tgene\t30000\t31000\t.\t+\t.\tName=unc%2D57%3B
";

    fn sample_db() -> InMemoryDatabase {
        Gff3Reader::new(Cursor::new(SAMPLE), "sample.gff3").read_database().unwrap()
    }

    #[test]
    fn test_sequence_region_becomes_landmark() {
        let db = sample_db();
        let hits = db.by_name_range(Some("Sequence"), "chrI", None, None).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].end(), 15_072_423);
    }

    #[test]
    fn test_sequence_region_keeps_its_start() {
        let gff = "##gff-version 3\n##sequence-region chrI 1000 5000\n";
        let db = Gff3Reader::new(Cursor::new(gff), "offset.gff3").read_database().unwrap();
        let hits = db.by_name_range(None, "chrI", None, None).unwrap();
        assert_eq!((hits[0].start(), hits[0].end()), (1000, 5000));

        let hits = db.by_name_range(None, "chrI", Some(1), Some(10)).unwrap();
        assert_eq!((hits[0].start(), hits[0].end()), (1000, 1009));

        let reversed = "##sequence-region chrI 5000 1000\n";
        assert!(Gff3Reader::new(Cursor::new(reversed), "bad.gff3").read_database().is_err());
    }

    #[test]
    fn test_names_and_aliases_indexed() {
        let db = sample_db();
        assert_eq!(db.by_name_range(None, "nlp-40", None, None).unwrap().len(), 1);
        assert_eq!(db.by_name_range(None, "Y74C9A.2", None, None).unwrap().len(), 1);
        assert_eq!(db.by_name_range(Some("gene"), "gene:WBGene00022276", None, None).unwrap().len(), 1);
    }

    #[test]
    fn test_class_attribute_and_method() {
        let db = sample_db();
        let subs = db.fetch_subfeatures_by_name(Some("EST"), "yk1054h04").unwrap();
        assert_eq!(subs.len(), 2);
        assert_eq!(subs[0].feature_type, "match");
        assert_eq!(subs[0].ref_class.as_deref(), Some("Sequence"));
    }

    #[test]
    fn test_attributes_url_decoded() {
        let db = sample_db();
        assert_eq!(db.by_name_range(None, "unc-57;", None, None).unwrap().len(), 1);
    }

    #[test]
    fn test_gene_method_includes_source() {
        let record = parse_gff3_line("chrI\tcurated\tgene\t1\t10\t.\t+\t.\tName=a").unwrap();
        assert_eq!(record.method(), "gene:curated");
    }

    #[test]
    fn test_bad_line_reports_position() {
        let bad = "chrI\t.\tgene\tone\t10\t.\t+\t.\tName=a\n";
        let err = Gff3Reader::new(Cursor::new(bad), "bad.gff3").read_database().unwrap_err();
        assert!(err.to_string().contains("bad.gff3"));
        assert!(err.to_string().contains("line 1"));
    }

    #[test]
    fn test_short_line_rejected() {
        assert!(parse_gff3_line("chrI\t.\tgene").is_err());
    }
}
