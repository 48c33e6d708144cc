//! Task locator: every line that represents a given task.

use serde::Serialize;

use crate::scanner::{scan, LineKind};

/// Line indices (zero-based) of each representation of one task.
///
/// Each slot holds the first matching line in document order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TaskLocation {
    pub header: Option<usize>,
    pub table: Option<usize>,
    pub status_detail: Option<usize>,
    pub priority_detail: Option<usize>,
}

impl TaskLocation {
    /// No representation of the task exists.
    pub fn is_empty(&self) -> bool {
        self.lines().is_empty()
    }

    /// Located line indices in ascending order.
    pub fn lines(&self) -> Vec<usize> {
        let mut lines: Vec<usize> = [
            self.header,
            self.table,
            self.status_detail,
            self.priority_detail,
        ]
        .into_iter()
        .flatten()
        .collect();
        lines.sort_unstable();
        lines
    }
}

/// Locate `task_id` in `text` with one scan.
///
/// An unknown task yields an empty location, not an error.
pub fn locate(text: &str, task_id: &str) -> TaskLocation {
    let mut location = TaskLocation::default();
    for line in scan(text).filter(|line| line.task == Some(task_id)) {
        let slot = match line.kind {
            LineKind::TaskHeader => &mut location.header,
            LineKind::TableRow => &mut location.table,
            LineKind::StatusDetail => &mut location.status_detail,
            LineKind::PriorityDetail => &mut location.priority_detail,
            LineKind::SectionBoundary | LineKind::Other => continue,
        };
        slot.get_or_insert(line.index);
    }
    location
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "\
# MASTER_PLAN

## Active Work

### TASK-1: Short id (📋 PLANNED)
**Status**: 📋 PLANNED
**Priority**: P2

### TASK-10: Longer id (🔄 IN PROGRESS)
**Status**: 🔄 IN PROGRESS

---

| ID | Status | Depends |
|----|--------|---------|
| **TASK-10** | 🔄 **IN PROGRESS** | TASK-1 |
| TASK-1 | PLANNED | - |
";

    #[test]
    fn finds_all_representations() {
        let location = locate(DOC, "TASK-1");
        assert_eq!(
            location,
            TaskLocation {
                header: Some(4),
                table: Some(16),
                status_detail: Some(5),
                priority_detail: Some(6),
            }
        );
        assert_eq!(location.lines(), vec![4, 5, 6, 16]);
    }

    #[test]
    fn prefix_ids_do_not_collide() {
        let location = locate(DOC, "TASK-10");
        assert_eq!(location.header, Some(8));
        assert_eq!(location.status_detail, Some(9));
        assert_eq!(location.priority_detail, None);
        assert_eq!(location.table, Some(15));
    }

    #[test]
    fn unknown_task_is_empty() {
        let location = locate(DOC, "TASK-999");
        assert!(location.is_empty());
        assert!(locate("", "TASK-1").is_empty());
    }

    #[test]
    fn table_only_task() {
        let location = locate("| ROAD-001 | Example | P2 | TODO |", "ROAD-001");
        assert_eq!(location.table, Some(0));
        assert_eq!(location.header, None);
    }
}
