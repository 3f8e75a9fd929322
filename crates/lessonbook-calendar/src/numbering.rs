//! Summary and module numbering of a class calendar.
//!
//! Entries are numbered in `(date, id)` order. Every counted lesson takes
//! the next global summary number and advances the current module; a module
//! is left once it reaches `total_lessons + tolerance`. Non-counting entries
//! carry no numbers at all.

use crate::generator::ModulePlan;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberingInput {
    /// Whether the entry's kind advances the sequence
    pub counts: bool,
    pub lesson_count: i64,
    pub non_lesson_time: i64,
}

impl NumberingInput {
    pub fn counted_lessons(&self) -> i64 {
        if self.counts {
            (self.lesson_count - self.non_lesson_time).max(0)
        } else {
            0
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Numbering {
    /// Module of the day's last lesson
    pub module_id: Option<i64>,
    /// That lesson's index inside its module
    pub module_number: Option<i64>,
    /// Last summary number of the day
    pub total_number: Option<i64>,
    /// Summary numbers joined by `,`
    pub summary_numbers: Option<String>,
}

/// Numbers `entries` (already in `(date, id)` order) against `modules`.
///
/// Returns one [`Numbering`] per entry, in the same order.
pub fn number_entries(entries: &[NumberingInput], modules: &[ModulePlan]) -> Vec<Numbering> {
    let mut progress = vec![0u32; modules.len()];
    let mut module_index = 0usize;
    let mut counter: i64 = 0;

    entries
        .iter()
        .map(|entry| {
            let lessons = entry.counted_lessons();
            if lessons == 0 {
                return Numbering::default();
            }

            let mut numbers = Vec::with_capacity(lessons as usize);
            let mut last_module: Option<(i64, i64)> = None;

            for _ in 0..lessons {
                counter += 1;
                numbers.push(counter.to_string());

                while module_index < modules.len()
                    && progress[module_index] >= modules[module_index].capacity()
                {
                    module_index += 1;
                }
                last_module = match modules.get(module_index) {
                    Some(module) => {
                        progress[module_index] += 1;
                        Some((module.id, i64::from(progress[module_index])))
                    }
                    None => None,
                };
            }

            Numbering {
                module_id: last_module.map(|(id, _)| id),
                module_number: last_module.map(|(_, number)| number),
                total_number: Some(counter),
                summary_numbers: Some(numbers.join(",")),
            }
        })
        .collect()
}
