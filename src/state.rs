use std::cmp::Reverse;

use crate::models::{Draft, Filter, Priority, Task, TaskId};

/// One user intent. Every action either fully applies or leaves the state
/// untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    SetDraftText(String),
    SetDraftDueDate(String),
    SetDraftPriority(Priority),
    /// Commit the draft as a new task.
    Add,
    Delete(TaskId),
    ToggleComplete(TaskId),
    BeginEdit(TaskId),
    EditText(TaskId, String),
    EndEdit(TaskId),
    ChangeDueDate(TaskId, String),
    ChangePriority(TaskId, Priority),
    ClearCompleted,
    SetFilter(Filter),
}

/// The whole task list session. Completion is read from each task's flag;
/// there is no separate completed collection to keep in sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoState {
    tasks: Vec<Task>,
    pub draft: Draft,
    pub editing: Option<TaskId>,
    pub filter: Filter,
    next_id: u64,
}

impl Default for TodoState {
    fn default() -> Self {
        TodoState {
            tasks: Vec::new(),
            draft: Draft::default(),
            editing: None,
            filter: Filter::All,
            next_id: 1,
        }
    }
}

/// Pure form of [`TodoState::apply`].
pub fn reduce(state: &TodoState, action: Action) -> TodoState {
    let mut next = state.clone();
    next.apply(action);
    next
}

impl TodoState {
    pub fn with_filter(filter: Filter) -> Self {
        TodoState {
            filter,
            ..Self::default()
        }
    }

    pub fn apply(&mut self, action: Action) {
        log::debug!("apply {:?}", action);
        match action {
            Action::SetDraftText(text) => self.draft.text = text,
            Action::SetDraftDueDate(date) => self.draft.due_date = date,
            Action::SetDraftPriority(priority) => self.draft.priority = priority,
            Action::Add => {
                let added = self.add(
                    self.draft.text.clone(),
                    self.draft.due_date.clone(),
                    self.draft.priority,
                );
                // Rejected adds keep what the user typed.
                if added.is_some() {
                    self.draft = Draft::default();
                }
            }
            Action::Delete(id) => self.delete(id),
            Action::ToggleComplete(id) => {
                if let Some(task) = self.task_mut(id) {
                    task.completed = !task.completed;
                    log::trace!("{} completed={}", id, task.completed);
                }
            }
            Action::BeginEdit(id) => {
                if self.task(id).is_some() {
                    self.editing = Some(id);
                }
            }
            Action::EditText(id, text) => {
                if let Some(task) = self.task_mut(id) {
                    task.text = text;
                }
            }
            Action::EndEdit(id) => {
                if self.editing == Some(id) {
                    self.editing = None;
                }
            }
            Action::ChangeDueDate(id, date) => {
                if let Some(task) = self.task_mut(id) {
                    task.due_date = date;
                }
            }
            Action::ChangePriority(id, priority) => {
                if let Some(task) = self.task_mut(id) {
                    task.priority = priority;
                }
            }
            Action::ClearCompleted => {
                let before = self.tasks.len();
                self.tasks.retain(|task| !task.completed);
                if let Some(id) = self.editing {
                    if self.task(id).is_none() {
                        self.editing = None;
                    }
                }
                log::trace!("cleared {} completed tasks", before - self.tasks.len());
            }
            Action::SetFilter(filter) => self.filter = filter,
        }
    }

    /// Appends a task unless `text` is blank. Leaves the draft alone; use
    /// [`Action::Add`] to commit and reset it.
    pub fn add(
        &mut self,
        text: impl Into<String>,
        due_date: impl Into<String>,
        priority: Priority,
    ) -> Option<TaskId> {
        let text = text.into();
        if text.trim().is_empty() {
            log::debug!("rejected task with empty text");
            return None;
        }
        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.tasks.push(Task::new(id, text, due_date, priority));
        Some(id)
    }

    fn delete(&mut self, id: TaskId) {
        self.tasks.retain(|task| task.id != id);
        if self.editing == Some(id) {
            self.editing = None;
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    fn task_mut(&mut self, id: TaskId) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|task| task.id == id)
    }

    pub fn is_editing(&self, id: TaskId) -> bool {
        self.editing == Some(id)
    }

    pub fn remaining(&self) -> usize {
        self.tasks.iter().filter(|task| !task.completed).count()
    }

    pub fn completed_count(&self) -> usize {
        self.tasks.len() - self.remaining()
    }

    pub fn has_completed(&self) -> bool {
        self.tasks.iter().any(|task| task.completed)
    }

    /// Tasks passing the active filter, highest priority first. Ties keep
    /// insertion order since `sort_by_key` is stable.
    pub fn visible(&self) -> Vec<&Task> {
        let mut visible: Vec<&Task> = self
            .tasks
            .iter()
            .filter(|task| self.filter.matches(task))
            .collect();
        visible.sort_by_key(|task| Reverse(task.priority.rank()));
        visible
    }

    pub fn status_line(&self) -> String {
        let remaining = self.remaining();
        let noun = if remaining == 1 { "todo" } else { "todos" };
        format!("{} remaining {}", remaining, noun)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(state: &TodoState) -> Vec<&str> {
        state.visible().iter().map(|task| task.text.as_str()).collect()
    }

    fn add_draft(state: &mut TodoState, text: &str, due: &str, priority: Priority) {
        state.apply(Action::SetDraftText(text.to_string()));
        state.apply(Action::SetDraftDueDate(due.to_string()));
        state.apply(Action::SetDraftPriority(priority));
        state.apply(Action::Add);
    }

    #[test]
    fn buy_milk_pay_rent_scenario() {
        let mut state = TodoState::default();
        add_draft(&mut state, "Buy milk", "", Priority::Low);
        add_draft(&mut state, "Pay rent", "2024-01-01", Priority::High);

        assert_eq!(state.remaining(), 2);
        assert_eq!(texts(&state), vec!["Pay rent", "Buy milk"]);

        let milk = state.tasks()[0].id;
        state.apply(Action::ToggleComplete(milk));
        assert_eq!(state.remaining(), 1);

        state.apply(Action::SetFilter(Filter::Completed));
        assert_eq!(texts(&state), vec!["Buy milk"]);

        state.apply(Action::ClearCompleted);
        let all: Vec<&str> = state.tasks().iter().map(|t| t.text.as_str()).collect();
        assert_eq!(all, vec!["Pay rent"]);
        assert!(!state.has_completed());
    }

    #[test]
    fn add_resets_draft() {
        let mut state = TodoState::default();
        add_draft(&mut state, "Water plants", "2024-03-03", Priority::Medium);

        assert_eq!(state.draft, Draft::default());
        let task = &state.tasks()[0];
        assert_eq!(task.due_date, "2024-03-03");
        assert_eq!(task.priority, Priority::Medium);
        assert!(!task.completed);
    }

    #[test]
    fn blank_text_is_rejected() {
        let mut state = TodoState::default();
        for text in ["", "   ", "\t\n"] {
            add_draft(&mut state, text, "2024-01-01", Priority::High);
        }
        assert!(state.tasks().is_empty());
        assert_eq!(state.remaining(), 0);
        assert_eq!(state.draft.priority, Priority::High);
    }

    #[test]
    fn accepted_adds_are_counted() {
        let mut state = TodoState::default();
        let inputs = ["a", " ", "b", "", "c "];
        for text in inputs {
            state.add(text, "", Priority::Low);
        }
        assert_eq!(state.remaining(), 3);
        // Untrimmed text is kept as typed.
        assert_eq!(state.tasks()[2].text, "c ");
    }

    #[test]
    fn ids_are_unique_and_not_reused() {
        let mut state = TodoState::default();
        let a = state.add("a", "", Priority::Low).unwrap();
        let b = state.add("b", "", Priority::Low).unwrap();
        state.apply(Action::Delete(b));
        let c = state.add("c", "", Priority::Low).unwrap();
        assert_ne!(a, b);
        assert_ne!(b, c);
        assert_ne!(a, c);
    }

    #[test]
    fn toggle_twice_restores_state() {
        let mut state = TodoState::default();
        let id = state.add("a", "", Priority::Low).unwrap();
        state.add("b", "", Priority::Low);
        let before = state.clone();

        state.apply(Action::ToggleComplete(id));
        assert!(state.task(id).unwrap().completed);
        assert_eq!(state.completed_count(), 1);

        state.apply(Action::ToggleComplete(id));
        assert_eq!(state, before);
    }

    #[test]
    fn toggle_keeps_position() {
        let mut state = TodoState::default();
        let a = state.add("a", "", Priority::Low).unwrap();
        state.add("b", "", Priority::Low);
        state.apply(Action::ToggleComplete(a));
        state.apply(Action::ToggleComplete(a));
        assert_eq!(texts(&state), vec!["a", "b"]);
    }

    #[test]
    fn delete_is_idempotent() {
        let mut state = TodoState::default();
        let id = state.add("a", "", Priority::Low).unwrap();
        state.add("b", "", Priority::Low);

        state.apply(Action::Delete(id));
        let once = state.clone();
        state.apply(Action::Delete(id));
        assert_eq!(state, once);
        assert_eq!(state.tasks().len(), 1);
    }

    #[test]
    fn unknown_ids_are_noops() {
        let mut state = TodoState::default();
        state.add("a", "", Priority::Low);
        let before = state.clone();
        let ghost = TaskId(999);
        for action in [
            Action::Delete(ghost),
            Action::ToggleComplete(ghost),
            Action::BeginEdit(ghost),
            Action::EditText(ghost, "x".into()),
            Action::EndEdit(ghost),
            Action::ChangeDueDate(ghost, "2024-01-01".into()),
            Action::ChangePriority(ghost, Priority::High),
        ] {
            state.apply(action);
        }
        assert_eq!(state, before);
    }

    #[test]
    fn clear_completed_keeps_active_in_order() {
        let mut state = TodoState::default();
        let ids: Vec<TaskId> = ["a", "b", "c", "d", "e"]
            .into_iter()
            .filter_map(|text| state.add(text, "", Priority::Low))
            .collect();
        state.apply(Action::ToggleComplete(ids[1]));
        state.apply(Action::ToggleComplete(ids[3]));

        state.apply(Action::ClearCompleted);
        let left: Vec<&str> = state.tasks().iter().map(|t| t.text.as_str()).collect();
        assert_eq!(left, vec!["a", "c", "e"]);
        assert!(state.tasks().iter().all(|t| !t.completed));
    }

    #[test]
    fn remaining_matches_flags_after_every_action() {
        let mut state = TodoState::default();
        let a = state.add("a", "", Priority::High).unwrap();
        let b = state.add("b", "", Priority::Low).unwrap();
        let actions = vec![
            Action::ToggleComplete(a),
            Action::ChangePriority(b, Priority::Medium),
            Action::SetDraftText("c".into()),
            Action::Add,
            Action::ToggleComplete(b),
            Action::Delete(a),
            Action::SetFilter(Filter::Active),
            Action::ClearCompleted,
            Action::ToggleComplete(TaskId(3)),
        ];
        for action in actions {
            state.apply(action);
            let expected = state.tasks().iter().filter(|t| !t.completed).count();
            assert_eq!(state.remaining(), expected);
            assert_eq!(state.completed_count() + state.remaining(), state.tasks().len());
        }
    }

    #[test]
    fn filters_select_matching_tasks() {
        let mut state = TodoState::default();
        let a = state.add("a", "", Priority::Low).unwrap();
        state.add("b", "", Priority::High);
        state.add("c", "", Priority::Medium);
        state.apply(Action::ToggleComplete(a));

        state.apply(Action::SetFilter(Filter::Active));
        assert!(state.visible().iter().all(|t| !t.completed));
        assert_eq!(state.visible().len(), 2);

        state.apply(Action::SetFilter(Filter::Completed));
        assert!(state.visible().iter().all(|t| t.completed));
        assert_eq!(texts(&state), vec!["a"]);

        state.apply(Action::SetFilter(Filter::All));
        assert_eq!(state.visible().len(), state.tasks().len());
    }

    #[test]
    fn visible_sorts_by_priority_and_keeps_ties_stable() {
        let mut state = TodoState::default();
        state.add("low 1", "", Priority::Low);
        state.add("high 1", "", Priority::High);
        state.add("medium 1", "", Priority::Medium);
        state.add("low 2", "", Priority::Low);
        state.add("high 2", "", Priority::High);

        assert_eq!(
            texts(&state),
            vec!["high 1", "high 2", "medium 1", "low 1", "low 2"]
        );
        let ranks: Vec<u8> = state.visible().iter().map(|t| t.priority.rank()).collect();
        assert!(ranks.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn edit_mode_tracks_a_single_task() {
        let mut state = TodoState::default();
        let a = state.add("a", "", Priority::Low).unwrap();
        let b = state.add("b", "", Priority::Low).unwrap();

        state.apply(Action::BeginEdit(a));
        assert!(state.is_editing(a));
        state.apply(Action::BeginEdit(b));
        assert!(!state.is_editing(a));
        assert!(state.is_editing(b));

        state.apply(Action::EditText(b, "".into()));
        assert_eq!(state.task(b).unwrap().text, "");

        state.apply(Action::EndEdit(a));
        assert!(state.is_editing(b));
        state.apply(Action::EditText(b, "bee".into()));
        state.apply(Action::EndEdit(b));
        assert_eq!(state.editing, None);
        assert_eq!(state.task(b).unwrap().text, "bee");
    }

    #[test]
    fn deleting_edited_task_leaves_edit_mode() {
        let mut state = TodoState::default();
        let a = state.add("a", "", Priority::Low).unwrap();
        state.apply(Action::BeginEdit(a));
        state.apply(Action::Delete(a));
        assert_eq!(state.editing, None);
    }

    #[test]
    fn clearing_edited_task_leaves_edit_mode() {
        let mut state = TodoState::default();
        let a = state.add("a", "", Priority::Low).unwrap();
        let b = state.add("b", "", Priority::Low).unwrap();
        state.apply(Action::ToggleComplete(a));

        state.apply(Action::BeginEdit(b));
        state.apply(Action::ClearCompleted);
        assert!(state.is_editing(b));

        state.apply(Action::ToggleComplete(b));
        state.apply(Action::ClearCompleted);
        assert_eq!(state.editing, None);
        assert!(state.tasks().is_empty());
    }

    #[test]
    fn due_date_and_priority_change_in_place() {
        let mut state = TodoState::default();
        let a = state.add("a", "", Priority::Low).unwrap();
        state.apply(Action::ChangeDueDate(a, "not a date".into()));
        state.apply(Action::ChangePriority(a, Priority::High));
        let task = state.task(a).unwrap();
        assert_eq!(task.due_date, "not a date");
        assert_eq!(task.priority, Priority::High);
    }

    #[test]
    fn reduce_leaves_input_untouched() {
        let state = TodoState::default();
        let next = reduce(&state, Action::SetDraftText("x".into()));
        let next = reduce(&next, Action::Add);
        assert!(state.tasks().is_empty());
        assert_eq!(next.tasks().len(), 1);
    }

    #[test]
    fn status_line_pluralizes() {
        let mut state = TodoState::default();
        assert_eq!(state.status_line(), "0 remaining todos");
        state.add("a", "", Priority::Low);
        assert_eq!(state.status_line(), "1 remaining todo");
        state.add("b", "", Priority::Low);
        assert_eq!(state.status_line(), "2 remaining todos");
    }
}
