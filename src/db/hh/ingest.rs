use itertools::Itertools;
use log::info;

use crate::db::hh::lib_hh::{fetch_for_all, EmployerRecord, VacancyRecord, VacancySource};
use crate::db::hh::vacancies_archive::HhVacanciesArchive;
use crate::error::ArchiveError;

/// The employers archived when no list is given on the command line.
pub const DEFAULT_EMPLOYER_IDS: [i64; 10] = [
    1455, 2329, 1740, 78638, 741581, 39729, 49728, 78607, 1428, 949463,
];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IngestSummary {
    pub employer_ids: usize,
    pub vacancies_fetched: usize,
    pub unique_employers: usize,
    pub employers_inserted: usize,
    pub vacancies_inserted: usize,
}

/// Employers embedded in the vacancies, in order of first appearance.
///
/// Two records are the same employer only if all their fields match.  If the
/// source ever returns different names for one id, both records are kept and
/// the store keeps whichever is inserted first.
pub fn unique_employers(vacancies: &[VacancyRecord]) -> Vec<EmployerRecord> {
    vacancies
        .iter()
        .map(|vacancy| vacancy.employer.clone())
        .unique()
        .collect()
}

/// Create the tables, fetch the vacancies of every employer and archive them.
/// Employers go in before the vacancies that reference them.
pub fn run<S: VacancySource + ?Sized>(
    archive: &HhVacanciesArchive,
    source: &S,
    employer_ids: &[i64],
) -> Result<IngestSummary, ArchiveError> {
    archive.create_tables()?;

    let vacancies = fetch_for_all(source, employer_ids)?;
    let employers = unique_employers(&vacancies);
    info!(
        "Fetched {} vacancies from {} distinct employers",
        vacancies.len(),
        employers.len()
    );

    let employers_inserted = archive.insert_employers(&employers)?;
    let vacancies_inserted = archive.insert_vacancies(&vacancies)?;

    Ok(IngestSummary {
        employer_ids: employer_ids.len(),
        vacancies_fetched: vacancies.len(),
        unique_employers: employers.len(),
        employers_inserted,
        vacancies_inserted,
    })
}
