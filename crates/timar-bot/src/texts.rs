// SPDX-FileCopyrightText: 2026 Timar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User-facing message templates and button labels.

pub const WELCOME: &str = "Welcome to Timar";

/// Reply-keyboard alias treated exactly like /start.
pub const MAIN_MENU_ALIAS: &str = "Main menu";

pub const BTN_MAIN_MENU: &str = "Main menu";
pub const BTN_MANAGE_TASKS: &str = "Manage tasks";
pub const BTN_MANAGE_EPICS: &str = "Manage epics";
pub const BTN_EDIT_NAME: &str = "Edit name";
pub const BTN_EDIT_DESCRIPTION: &str = "Edit description";
pub const BTN_DELETE_EPIC: &str = "Delete epic";
pub const BTN_DELETE_TASK: &str = "Delete task";
pub const BTN_START_TIMER: &str = "Start timer";
pub const BTN_STOP_TIMER: &str = "Stop";
pub const BTN_DELETE_TIMER: &str = "Discard";

pub const MANAGE_EPICS: &str = "Epic management\n\
    Send /new_epic to create a new epic.\n\
    Pick one of your epics below to view, edit, or delete it.";

pub const MANAGE_EPICS_EMPTY: &str = "Epic management\n\
    You have no epics yet.\n\
    Send /new_epic to create one.";

pub const MANAGE_TASKS: &str = "Task management\n\
    Send /new_task to create a new task.\n\
    Pick one of your tasks below to view, edit, or delete it.";

pub const MANAGE_TASKS_EMPTY: &str = "Task management\n\
    You have no tasks yet.\n\
    Send /new_task to create one.";

pub const NEW_EPIC_PROMPT: &str = "Creating a new epic.\n\
    Send the title on the first line; everything after it becomes the description.";

pub const NO_EPICS: &str = "You have no active epics.";

pub const SELECT_EPIC_FOR_TASK: &str = "Pick the epic this task belongs to.";

pub const NEW_TASK_PROMPT: &str =
    "Send the task title on the first line; everything after it becomes the description.";

pub const EDIT_PROMPT: &str = "Send the new value.";

pub const EPIC_EDITED: &str = "Epic updated.";
pub const TASK_EDITED: &str = "Task updated.";

pub const TIMER_DELETED: &str = "This task's timer was discarded.";

pub const SHUTTING_DOWN: &str = "Shutting down.";

pub fn epic_created(name: &str) -> String {
    format!("Epic \"{name}\" created.")
}

pub fn task_created(name: &str) -> String {
    format!("Task \"{name}\" created.")
}

pub fn epic_overview(name: &str, description: &str) -> String {
    format!("Epic \"{name}\"\nDescription: {description}")
}

pub fn task_overview(name: &str, description: &str) -> String {
    format!("Task \"{name}\"\nDescription: {description}")
}

pub fn epic_deleted(name: &str) -> String {
    format!("Epic \"{name}\" deleted.")
}

pub fn task_deleted(name: &str) -> String {
    format!("Task \"{name}\" deleted.")
}

pub fn timer_running(name: &str, elapsed: &str) -> String {
    format!(
        "Timer for \"{name}\" is running.\n\
         Press Stop when you are done.\n\
         Time spent so far: {elapsed}"
    )
}

pub fn timer_stopped(name: &str, elapsed: &str) -> String {
    format!("Timer for \"{name}\" stopped.\nTime spent: {elapsed}")
}

/// Elapsed text never renders an empty duration to the user.
pub fn elapsed_or_zero(elapsed: String) -> String {
    if elapsed.is_empty() {
        "0 seconds".to_string()
    } else {
        elapsed
    }
}
