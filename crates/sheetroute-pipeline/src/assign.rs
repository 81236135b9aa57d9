use crate::categorize::{Bucket, Categorized};
use serde::{Deserialize, Serialize};
use sheetroute_common::{CellValue, Row, Table};

/// Ordered owner names for one bucket. Blank names are dropped on
/// construction; an empty list is valid and selects the bucket sentinel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct AssigneeList(Vec<String>);

impl AssigneeList {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            names
                .into_iter()
                .map(|n| n.as_ref().trim().to_string())
                .filter(|n| !n.is_empty())
                .collect(),
        )
    }

    /// Split free text on commas, semicolons and line breaks.
    pub fn parse(text: &str) -> Self {
        Self::new(text.split([',', ';', '\n', '\r']))
    }

    pub fn names(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Owner of the row at 0-based `position` within a bucket.
    pub fn owner_at(&self, position: usize) -> Option<&str> {
        if self.0.is_empty() {
            return None;
        }
        Some(&self.0[position % self.0.len()])
    }
}

impl From<Vec<String>> for AssigneeList {
    fn from(names: Vec<String>) -> Self {
        Self::new(names)
    }
}

impl From<AssigneeList> for Vec<String> {
    fn from(list: AssigneeList) -> Self {
        list.0
    }
}

/// One name list per bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Assignees {
    pub cn: AssigneeList,
    pub jp: AssigneeList,
    pub special: AssigneeList,
    pub general: AssigneeList,
}

impl Assignees {
    pub fn get(&self, bucket: Bucket) -> &AssigneeList {
        match bucket {
            Bucket::Cn => &self.cn,
            Bucket::Jp => &self.jp,
            Bucket::Special => &self.special,
            Bucket::General => &self.general,
        }
    }

    pub fn get_mut(&mut self, bucket: Bucket) -> &mut AssigneeList {
        match bucket {
            Bucket::Cn => &mut self.cn,
            Bucket::Jp => &mut self.jp,
            Bucket::Special => &mut self.special,
            Bucket::General => &mut self.general,
        }
    }

    /// Replace each bucket list for which `other` supplies names.
    pub fn overridden_by(mut self, other: &Assignees) -> Self {
        for bucket in Bucket::ALL {
            let names = other.get(bucket);
            if !names.is_empty() {
                *self.get_mut(bucket) = names.clone();
            }
        }
        self
    }
}

/// Owner for the row at `position` of `bucket`: round-robin over `list`, or
/// the bucket sentinel when `list` is empty.
pub fn owner_for(list: &AssigneeList, bucket: Bucket, position: usize) -> &str {
    list.owner_at(position).unwrap_or(bucket.sentinel())
}

/// Prepend an owner cell to every categorized row, and the owner label to the
/// header. Positions restart in every bucket of every partition.
pub fn assign_owners(
    categorized: Categorized,
    assignees: &Assignees,
    owner_header: &str,
) -> Table {
    let _span = tracing::info_span!("assign", rows = categorized.len()).entered();
    let Categorized {
        mut header,
        partitions,
        ..
    } = categorized;
    header.insert(0, CellValue::from(owner_header));

    let mut rows: Vec<Row> = Vec::new();
    for partition in partitions {
        for (bucket, bucket_rows) in partition.buckets.into_buckets() {
            let list = assignees.get(bucket);
            if list.is_empty() && !bucket_rows.is_empty() {
                tracing::debug!(
                    %bucket,
                    rows = bucket_rows.len(),
                    "no assignees; using sentinel"
                );
            }
            rows.extend(bucket_rows.into_iter().enumerate().map(|(i, mut row)| {
                row.insert(0, CellValue::from(owner_for(list, bucket, i)));
                row
            }));
        }
    }
    Table::from_parts(header, rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::categorize::{Buckets, Partition, PartitionKind};
    use sheetroute_testkit::row;

    #[test]
    fn parse_splits_and_drops_blanks() {
        let list = AssigneeList::parse(" Alice, Bob;;\r\nCarol\n ,");
        assert_eq!(list.names(), ["Alice", "Bob", "Carol"]);
        assert!(AssigneeList::parse(" , ;\n").is_empty());
    }

    #[test]
    fn owners_cycle_by_position() {
        let list = AssigneeList::new(["Alice", "Bob"]);
        let owners: Vec<_> = (0..3).map(|i| owner_for(&list, Bucket::Cn, i)).collect();
        assert_eq!(owners, ["Alice", "Bob", "Alice"]);
    }

    #[test]
    fn empty_list_uses_sentinel() {
        let list = AssigneeList::default();
        assert_eq!(owner_for(&list, Bucket::General, 4), "UNASSIGNED_GENERAL");
    }

    #[test]
    fn overrides_only_replace_supplied_buckets() {
        let base = Assignees {
            cn: AssigneeList::new(["Li"]),
            jp: AssigneeList::new(["Sato"]),
            ..Assignees::default()
        };
        let cli = Assignees {
            jp: AssigneeList::new(["Ito"]),
            ..Assignees::default()
        };
        let merged = base.overridden_by(&cli);
        assert_eq!(merged.cn.names(), ["Li"]);
        assert_eq!(merged.jp.names(), ["Ito"]);
        assert!(merged.general.is_empty());
    }

    fn partition(kind: PartitionKind, rows: &[(Bucket, i64)]) -> Partition {
        let mut buckets = Buckets::default();
        for (bucket, key) in rows {
            buckets.push(*bucket, row![*key]);
        }
        Partition { kind, buckets }
    }

    #[test]
    fn prepends_owner_and_restarts_per_partition() {
        let categorized = Categorized {
            header: row!["id"],
            partitions: vec![
                partition(PartitionKind::Flagged, &[(Bucket::Cn, 1), (Bucket::Cn, 2)]),
                partition(PartitionKind::Other, &[(Bucket::Cn, 3), (Bucket::General, 4)]),
            ],
            resolved: 0,
        };
        let assignees = Assignees {
            cn: AssigneeList::new(["Alice", "Bob"]),
            ..Assignees::default()
        };
        let out = assign_owners(categorized, &assignees, "Assignee");
        assert_eq!(out.header().unwrap(), &row!["Assignee", "id"]);
        assert_eq!(
            out.data(),
            &[
                row!["Alice", 1],
                row!["Bob", 2],
                row!["Alice", 3],
                row!["UNASSIGNED_GENERAL", 4],
            ]
        );
    }
}
