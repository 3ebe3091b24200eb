pub mod ingest;
pub mod lib_hh;
pub mod vacancies_archive;
