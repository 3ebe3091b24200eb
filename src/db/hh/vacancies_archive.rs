use duckdb::{params, AccessMode, Connection};
use log::info;

use crate::config::DbConfig;
use crate::db::hh::lib_hh::{EmployerRecord, VacancyRecord};
use crate::error::ArchiveError;
use crate::utils::lib_duckdb::open_connection;

#[derive(Clone, Debug)]
pub struct HhVacanciesArchive {
    pub duckdb_path: String,
}

/// A row of the `employers` table.
#[derive(Clone, Debug, PartialEq)]
pub struct Employer {
    pub id: i64,
    pub name: String,
    pub url: Option<String>,
}

/// A row of the `vacancies` table.
#[derive(Clone, Debug, PartialEq)]
pub struct Vacancy {
    pub id: i64,
    pub name: String,
    pub salary_from: Option<i64>,
    pub salary_to: Option<i64>,
    pub currency: Option<String>,
    pub url: Option<String>,
    pub employer_id: i64,
}

impl From<&EmployerRecord> for Employer {
    fn from(record: &EmployerRecord) -> Self {
        Employer {
            id: record.id,
            name: record.name.clone(),
            url: record.alternate_url.clone(),
        }
    }
}

impl From<&VacancyRecord> for Vacancy {
    /// No salary sub-record means all three salary columns are null.
    fn from(record: &VacancyRecord) -> Self {
        let (salary_from, salary_to, currency) = match &record.salary {
            Some(salary) => (salary.from, salary.to, salary.currency.clone()),
            None => (None, None, None),
        };
        Vacancy {
            id: record.id,
            name: record.name.clone(),
            salary_from,
            salary_to,
            currency,
            url: record.alternate_url.clone(),
            employer_id: record.employer.id,
        }
    }
}

impl From<DbConfig> for HhVacanciesArchive {
    fn from(config: DbConfig) -> Self {
        HhVacanciesArchive {
            duckdb_path: config.duckdb_path,
        }
    }
}

impl HhVacanciesArchive {
    /// Open a fresh read/write connection.  Each write below uses its own.
    fn open(&self) -> Result<Connection, ArchiveError> {
        open_connection(&self.duckdb_path, AccessMode::ReadWrite)
    }

    /// Safe to call on every start.
    pub fn create_tables(&self) -> Result<(), ArchiveError> {
        let conn = self.open()?;
        conn.execute_batch(
            r"
BEGIN TRANSACTION;
CREATE TABLE IF NOT EXISTS employers (
    id BIGINT PRIMARY KEY,
    name VARCHAR NOT NULL,
    url VARCHAR
);
CREATE TABLE IF NOT EXISTS vacancies (
    id BIGINT PRIMARY KEY,
    name VARCHAR NOT NULL,
    salary_from BIGINT,
    salary_to BIGINT,
    currency VARCHAR,
    url VARCHAR,
    employer_id BIGINT NOT NULL REFERENCES employers(id)
);
COMMIT;",
        )?;
        Ok(())
    }

    /// Insert the employers, skipping ids already in the table.
    /// Return the number of new rows.
    pub fn insert_employers(&self, employers: &[EmployerRecord]) -> Result<usize, ArchiveError> {
        let mut conn = self.open()?;
        let tx = conn.transaction()?;
        let before = row_count(&tx, "employers")?;
        {
            let mut stmt = tx.prepare(
                r"
INSERT INTO employers (id, name, url)
VALUES (?, ?, ?)
ON CONFLICT (id) DO NOTHING;",
            )?;
            for employer in employers.iter().map(Employer::from) {
                stmt.execute(params![employer.id, employer.name, employer.url])?;
            }
        }
        let inserted = row_count(&tx, "employers")? - before;
        tx.commit()?;
        info!(
            "{} employers were inserted, {} already present",
            inserted,
            employers.len() - inserted
        );
        Ok(inserted)
    }

    /// Insert the vacancies, skipping ids already in the table.  The employers
    /// they reference must be inserted first.  Return the number of new rows.
    pub fn insert_vacancies(&self, vacancies: &[VacancyRecord]) -> Result<usize, ArchiveError> {
        let mut conn = self.open()?;
        let tx = conn.transaction()?;
        let before = row_count(&tx, "vacancies")?;
        {
            let mut stmt = tx.prepare(
                r"
INSERT INTO vacancies (id, name, salary_from, salary_to, currency, url, employer_id)
VALUES (?, ?, ?, ?, ?, ?, ?)
ON CONFLICT (id) DO NOTHING;",
            )?;
            for vacancy in vacancies.iter().map(Vacancy::from) {
                stmt.execute(params![
                    vacancy.id,
                    vacancy.name,
                    vacancy.salary_from,
                    vacancy.salary_to,
                    vacancy.currency,
                    vacancy.url,
                    vacancy.employer_id,
                ])?;
            }
        }
        let inserted = row_count(&tx, "vacancies")? - before;
        tx.commit()?;
        info!(
            "{} vacancies were inserted, {} already present",
            inserted,
            vacancies.len() - inserted
        );
        Ok(inserted)
    }
}

/// Number of rows in one of the archive tables.
pub fn row_count(conn: &Connection, table: &str) -> Result<usize, ArchiveError> {
    let n: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {};", table), [], |row| {
        row.get(0)
    })?;
    Ok(n as usize)
}

pub fn get_employers(conn: &Connection) -> Result<Vec<Employer>, ArchiveError> {
    let mut stmt = conn.prepare("SELECT id, name, url FROM employers ORDER BY id;")?;
    let rows = stmt.query_map([], |row| {
        Ok(Employer {
            id: row.get::<usize, i64>(0)?,
            name: row.get::<usize, String>(1)?,
            url: row.get::<usize, Option<String>>(2)?,
        })
    })?;
    let results: Vec<Employer> = rows.collect::<Result<_, _>>()?;
    Ok(results)
}

pub fn get_vacancies(conn: &Connection) -> Result<Vec<Vacancy>, ArchiveError> {
    let mut stmt = conn.prepare(
        r"
SELECT id, name, salary_from, salary_to, currency, url, employer_id
FROM vacancies
ORDER BY id;",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(Vacancy {
            id: row.get::<usize, i64>(0)?,
            name: row.get::<usize, String>(1)?,
            salary_from: row.get::<usize, Option<i64>>(2)?,
            salary_to: row.get::<usize, Option<i64>>(3)?,
            currency: row.get::<usize, Option<String>>(4)?,
            url: row.get::<usize, Option<String>>(5)?,
            employer_id: row.get::<usize, i64>(6)?,
        })
    })?;
    let results: Vec<Vacancy> = rows.collect::<Result<_, _>>()?;
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::hh::lib_hh::SalaryRecord;
    use std::error::Error;

    fn temp_archive(dir: &tempfile::TempDir) -> HhVacanciesArchive {
        HhVacanciesArchive {
            duckdb_path: dir.path().join("hh.duckdb").display().to_string(),
        }
    }

    fn employer(id: i64, name: &str) -> EmployerRecord {
        EmployerRecord {
            id,
            name: name.to_string(),
            alternate_url: Some(format!("https://hh.ru/employer/{}", id)),
        }
    }

    #[test]
    fn create_tables_twice() -> Result<(), Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        let archive = temp_archive(&dir);
        archive.create_tables()?;
        archive.create_tables()?;
        let conn = open_connection(&archive.duckdb_path, AccessMode::ReadOnly)?;
        assert_eq!(row_count(&conn, "employers")?, 0);
        assert_eq!(row_count(&conn, "vacancies")?, 0);
        Ok(())
    }

    #[test]
    fn insert_employers_ignores_conflicts() -> Result<(), Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        let archive = temp_archive(&dir);
        archive.create_tables()?;
        let n = archive.insert_employers(&[employer(1, "A"), employer(2, "B")])?;
        assert_eq!(n, 2);
        // same id with a different name, the first row wins
        let n = archive.insert_employers(&[employer(1, "A renamed"), employer(3, "C")])?;
        assert_eq!(n, 1);

        let conn = open_connection(&archive.duckdb_path, AccessMode::ReadOnly)?;
        let xs = get_employers(&conn)?;
        assert_eq!(xs.len(), 3);
        assert_eq!(
            xs[0],
            Employer {
                id: 1,
                name: "A".to_string(),
                url: Some("https://hh.ru/employer/1".to_string()),
            }
        );
        Ok(())
    }

    #[test]
    fn insert_vacancies_salary_columns() -> Result<(), Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        let archive = temp_archive(&dir);
        archive.create_tables()?;
        archive.insert_employers(&[employer(1, "A")])?;
        let vacancies = vec![
            VacancyRecord {
                id: 10,
                name: "With salary".to_string(),
                alternate_url: Some("https://hh.ru/vacancy/10".to_string()),
                employer: employer(1, "A"),
                salary: Some(SalaryRecord {
                    from: Some(1000),
                    to: Some(2000),
                    currency: Some("RUR".to_string()),
                }),
            },
            VacancyRecord {
                id: 11,
                name: "No salary".to_string(),
                alternate_url: None,
                employer: employer(1, "A"),
                salary: None,
            },
        ];
        assert_eq!(archive.insert_vacancies(&vacancies)?, 2);
        assert_eq!(archive.insert_vacancies(&vacancies)?, 0);

        let conn = open_connection(&archive.duckdb_path, AccessMode::ReadOnly)?;
        let xs = get_vacancies(&conn)?;
        assert_eq!(xs.len(), 2);
        assert_eq!(
            xs[0],
            Vacancy {
                id: 10,
                name: "With salary".to_string(),
                salary_from: Some(1000),
                salary_to: Some(2000),
                currency: Some("RUR".to_string()),
                url: Some("https://hh.ru/vacancy/10".to_string()),
                employer_id: 1,
            }
        );
        assert_eq!(xs[1].salary_from, None);
        assert_eq!(xs[1].salary_to, None);
        assert_eq!(xs[1].currency, None);
        Ok(())
    }

    #[test]
    fn vacancy_needs_its_employer() -> Result<(), Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        let archive = temp_archive(&dir);
        archive.create_tables()?;
        let orphan = VacancyRecord {
            id: 10,
            name: "Orphan".to_string(),
            alternate_url: None,
            employer: employer(99, "Missing"),
            salary: None,
        };
        let res = archive.insert_vacancies(&[orphan]);
        assert!(matches!(res, Err(ArchiveError::Database(_))));

        // the failed transaction left nothing behind
        let conn = open_connection(&archive.duckdb_path, AccessMode::ReadOnly)?;
        assert_eq!(row_count(&conn, "vacancies")?, 0);
        Ok(())
    }

    #[test]
    fn insert_without_database_dir_fails() {
        let archive = HhVacanciesArchive {
            duckdb_path: "/does/not/exist/hh.duckdb".to_string(),
        };
        let res = archive.create_tables();
        assert!(matches!(res, Err(ArchiveError::Connection { .. })));
    }
}
