// Display ordering for a user's elements
//
// Stages run in a fixed order and each relies on the tie-breaking of the one
// before it: date, type within a date, work/done split, urgency window.

use crate::error::Result;
use crate::models::{Element, ElementState, ElementType};
use chrono::{Days, NaiveDate};
use tracing::debug;

/// Days ahead of today that count as urgent
pub const URGENCY_WINDOW_DAYS: u64 = 3;

/// Element paired with its parsed date
#[derive(Debug, Clone)]
struct Dated {
    date: NaiveDate,
    element: Element,
}

/// Order elements for display using the default urgency window
pub fn sort_elements(elements: &[Element], today: NaiveDate) -> Result<Vec<Element>> {
    sort_elements_within(elements, today, URGENCY_WINDOW_DAYS)
}

/// Order elements for display.
///
/// Fails with `MalformedDate` if any element's date does not parse; no
/// partial ordering is returned in that case.
pub fn sort_elements_within(elements: &[Element], today: NaiveDate, window_days: u64) -> Result<Vec<Element>> {
    let dated = elements
        .iter()
        .map(|element| {
            Ok(Dated {
                date: element.parsed_date()?,
                element: element.clone(),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let dated = sort_by_type(sort_by_date(dated));
    let (work, done) = sort_by_state(dated);
    let work = apply_urgency_window(work, today, window_days);

    Ok(work.into_iter().chain(done).map(|d| d.element).collect())
}

fn sort_by_date(mut items: Vec<Dated>) -> Vec<Dated> {
    items.sort_by_key(|d| d.date);
    items
}

/// Tests first, then quizzes, then homework
fn type_rank(kind: ElementType) -> u8 {
    match kind {
        ElementType::Test => 0,
        ElementType::Quiz => 1,
        ElementType::Homework => 2,
    }
}

// Reorders only inside runs of equal dates; runs keep their position
fn sort_by_type(mut items: Vec<Dated>) -> Vec<Dated> {
    for group in items.chunk_by_mut(|a, b| a.date == b.date) {
        if group.len() > 1 {
            group.sort_by_key(|d| type_rank(d.element.kind));
        }
    }
    items
}

fn sort_by_state(items: Vec<Dated>) -> (Vec<Dated>, Vec<Dated>) {
    items.into_iter().partition(|d| d.element.state == ElementState::Work)
}

/// With nothing due inside the window, homework moves ahead of tests and quizzes
fn apply_urgency_window(work: Vec<Dated>, today: NaiveDate, window_days: u64) -> Vec<Dated> {
    let horizon = today.checked_add_days(Days::new(window_days)).unwrap_or(NaiveDate::MAX);
    let urgent = work.iter().filter(|d| d.date >= today && d.date <= horizon).count();

    if urgent > 0 {
        debug!(urgent, window_days, "apply_urgency_window: keeping date order");
        return work;
    }

    debug!(window_days, "apply_urgency_window: nothing urgent, homework first");
    let (homework, rest): (Vec<_>, Vec<_>) = work
        .into_iter()
        .partition(|d| d.element.kind == ElementType::Homework);
    homework.into_iter().chain(rest).collect()
}
