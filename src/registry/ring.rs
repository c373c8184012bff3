//! # Registry storage and ring operations.

use std::collections::{HashMap, VecDeque};

use nix::unistd::Pid;

use crate::registry::record::{TaskId, TaskRecord, TaskRole};

/// Circular, ordered collection of task records.
///
/// ### Invariants
/// - `ring` and `tasks` always hold exactly the same id set.
/// - `running`, when `Some`, names a current member of the ring.
/// - Insertion is always at the tail: admission order is rotation order.
/// - Removing the last record leaves the registry empty with no running task.
///
/// When the running task is removed, its successor must be captured with
/// [`Registry::next_after`] *before* the removal; [`Registry::remove`] clears
/// the running slot rather than guessing a replacement.
#[derive(Debug, Default)]
pub struct Registry {
    tasks: HashMap<TaskId, TaskRecord>,
    ring: VecDeque<TaskId>,
    running: Option<TaskId>,
    next_id: u32,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Admits a new task at the tail of the rotation.
    ///
    /// Returns the assigned id. Ids start at 1, like the original numbering
    /// the shell displays to users.
    pub fn insert(&mut self, pid: Pid, name: impl Into<String>, role: TaskRole) -> TaskId {
        self.next_id += 1;
        let id = TaskId(self.next_id);
        self.tasks.insert(
            id,
            TaskRecord {
                id,
                pid,
                name: name.into(),
                role,
            },
        );
        self.ring.push_back(id);
        id
    }

    /// Unlinks a record by id, returning it.
    ///
    /// If the removed task owned the running slot, the slot is cleared; the
    /// dispatcher repoints it from the successor it captured beforehand.
    pub fn remove(&mut self, id: TaskId) -> Option<TaskRecord> {
        let rec = self.tasks.remove(&id)?;
        if let Some(pos) = self.ring.iter().position(|&r| r == id) {
            self.ring.remove(pos);
        }
        if self.running == Some(id) {
            self.running = None;
        }
        Some(rec)
    }

    /// Unlinks a record by process id; no-op if absent.
    pub fn remove_by_pid(&mut self, pid: Pid) -> Option<TaskRecord> {
        let id = self.id_for_pid(pid)?;
        self.remove(id)
    }

    /// Returns whether any tracked task has the given process id.
    ///
    /// Used to classify asynchronous notifications: a pid that is not here
    /// belongs to an already-removed task and the notification is ignored.
    pub fn contains_pid(&self, pid: Pid) -> bool {
        self.id_for_pid(pid).is_some()
    }

    /// Returns the id of the task with the given process id.
    pub fn id_for_pid(&self, pid: Pid) -> Option<TaskId> {
        self.ring
            .iter()
            .find(|id| self.tasks[id].pid == pid)
            .copied()
    }

    /// Looks up a record by scheduler id, for the `kill-task` command.
    pub fn find_by_id(&self, id: TaskId) -> Option<&TaskRecord> {
        self.tasks.get(&id)
    }

    /// Returns the circular successor of `id` in rotation order.
    ///
    /// With a single record this is the record itself. Returns `None` only
    /// if `id` is not a member.
    pub fn next_after(&self, id: TaskId) -> Option<TaskId> {
        let pos = self.ring.iter().position(|&r| r == id)?;
        let next = (pos + 1) % self.ring.len();
        Some(self.ring[next])
    }

    /// Returns the first-admitted task still in the rotation.
    pub fn head(&self) -> Option<TaskId> {
        self.ring.front().copied()
    }

    /// Returns the task currently owning the running slot.
    pub fn running(&self) -> Option<TaskId> {
        self.running
    }

    /// Repoints the running slot.
    ///
    /// The target must be a current member of the ring (or `None`).
    pub fn set_running(&mut self, id: Option<TaskId>) {
        debug_assert!(id.map_or(true, |id| self.tasks.contains_key(&id)));
        self.running = id;
    }

    /// Number of tracked tasks.
    pub fn len(&self) -> usize {
        self.ring.len()
    }

    /// Returns whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    /// Iterates over records in rotation order, starting at the head.
    pub fn iter_ring(&self) -> impl Iterator<Item = &TaskRecord> {
        self.ring.iter().map(|id| &self.tasks[id])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pid(n: i32) -> Pid {
        Pid::from_raw(n)
    }

    /// The single-cycle invariant: ring and map agree, running is a member.
    fn assert_consistent(reg: &Registry) {
        assert_eq!(reg.ring.len(), reg.tasks.len());
        for id in &reg.ring {
            assert!(reg.tasks.contains_key(id));
        }
        if let Some(run) = reg.running {
            assert!(reg.ring.contains(&run));
        }
        if reg.is_empty() {
            assert!(reg.running.is_none());
        }
    }

    #[test]
    fn test_insert_preserves_admission_order() {
        let mut reg = Registry::new();
        let a = reg.insert(pid(10), "./a", TaskRole::Shell);
        let b = reg.insert(pid(11), "./b", TaskRole::Worker);
        let c = reg.insert(pid(12), "./c", TaskRole::Worker);

        let order: Vec<TaskId> = reg.iter_ring().map(|r| r.id).collect();
        assert_eq!(order, vec![a, b, c]);
        assert_eq!(reg.head(), Some(a));
        assert_consistent(&reg);
    }

    #[test]
    fn test_ids_are_monotonic_and_never_reused() {
        let mut reg = Registry::new();
        let a = reg.insert(pid(1), "./a", TaskRole::Worker);
        reg.remove(a);
        let b = reg.insert(pid(2), "./b", TaskRole::Worker);
        assert!(b > a);
        assert_consistent(&reg);
    }

    #[test]
    fn test_next_after_wraps_around() {
        let mut reg = Registry::new();
        let a = reg.insert(pid(1), "./a", TaskRole::Worker);
        let b = reg.insert(pid(2), "./b", TaskRole::Worker);
        let c = reg.insert(pid(3), "./c", TaskRole::Worker);

        assert_eq!(reg.next_after(a), Some(b));
        assert_eq!(reg.next_after(b), Some(c));
        assert_eq!(reg.next_after(c), Some(a));
    }

    #[test]
    fn test_next_after_sole_record_is_self() {
        let mut reg = Registry::new();
        let a = reg.insert(pid(1), "./a", TaskRole::Worker);
        assert_eq!(reg.next_after(a), Some(a));
    }

    #[test]
    fn test_remove_sole_record_empties_registry() {
        let mut reg = Registry::new();
        let a = reg.insert(pid(1), "./a", TaskRole::Worker);
        reg.set_running(Some(a));
        let rec = reg.remove(a).unwrap();
        assert_eq!(rec.pid, pid(1));
        assert!(reg.is_empty());
        assert_eq!(reg.running(), None);
        assert_consistent(&reg);
    }

    #[test]
    fn test_remove_running_clears_slot() {
        let mut reg = Registry::new();
        let a = reg.insert(pid(1), "./a", TaskRole::Worker);
        let b = reg.insert(pid(2), "./b", TaskRole::Worker);
        reg.set_running(Some(a));

        // Dispatcher discipline: capture the successor before removing.
        let next = reg.next_after(a);
        reg.remove(a);
        assert_eq!(reg.running(), None);
        assert_eq!(next, Some(b));
        reg.set_running(next);
        assert_consistent(&reg);
    }

    #[test]
    fn test_remove_by_pid_absent_is_noop() {
        let mut reg = Registry::new();
        reg.insert(pid(1), "./a", TaskRole::Worker);
        assert!(reg.remove_by_pid(pid(99)).is_none());
        assert_eq!(reg.len(), 1);
        assert_consistent(&reg);
    }

    #[test]
    fn test_contains_pid_after_removal() {
        let mut reg = Registry::new();
        let a = reg.insert(pid(5), "./a", TaskRole::Worker);
        assert!(reg.contains_pid(pid(5)));
        reg.remove(a);
        assert!(!reg.contains_pid(pid(5)));
    }

    #[test]
    fn test_find_by_id_distinguishes_not_found() {
        let mut reg = Registry::new();
        let a = reg.insert(pid(1), "./a", TaskRole::Worker);
        assert!(reg.find_by_id(a).is_some());
        assert!(reg.find_by_id(TaskId(999)).is_none());
    }

    #[test]
    fn test_arbitrary_insert_remove_keeps_single_cycle() {
        let mut reg = Registry::new();
        let mut ids = Vec::new();
        for i in 0..8 {
            ids.push(reg.insert(pid(100 + i), format!("./t{i}"), TaskRole::Worker));
        }
        for id in ids.iter().step_by(2) {
            reg.remove(*id);
            assert_consistent(&reg);
        }
        // Survivors still form one cycle in admission order.
        let order: Vec<TaskId> = reg.iter_ring().map(|r| r.id).collect();
        let expected: Vec<TaskId> = ids.iter().copied().skip(1).step_by(2).collect();
        assert_eq!(order, expected);
        let last = *order.last().unwrap();
        assert_eq!(reg.next_after(last), Some(order[0]));
    }
}
