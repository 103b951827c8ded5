//! Repository for database operations
//!
//! Every list, dropdown and insert the web layer performs goes through here.
//! Inserts that reference other rows resolve those references inside the
//! statement itself (`INSERT ... SELECT ... WHERE key = $n`), so a missing
//! referenced row inserts nothing.

use crate::db::models::*;
use crate::db::{DbPool, Report, ReportTable};
use crate::errors::{AppError, Result};
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DatabaseConnection, DbBackend, EntityTrait,
    FromQueryResult, NotSet, QueryOrder, QuerySelect, Set, Statement, TransactionTrait,
};

/// Repository for data access operations
#[derive(Clone)]
pub struct Repository {
    pool: DbPool,
}

impl Repository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> &DatabaseConnection {
        self.pool.conn()
    }

    // ========================================================================
    // Health Check
    // ========================================================================

    /// Ping the database
    pub async fn ping(&self) -> Result<()> {
        self.pool.ping().await
    }

    // ========================================================================
    // Donors
    // ========================================================================

    pub async fn list_donors(&self) -> Result<Vec<Donor>> {
        DonorEntity::find()
            .order_by_asc(DonorColumn::Surname)
            .order_by_asc(DonorColumn::Name)
            .all(self.conn())
            .await
            .map_err(Into::into)
    }

    pub async fn create_donor(&self, input: NewDonor) -> Result<Donor> {
        let donor = DonorActiveModel {
            cf: Set(input.cf),
            name: Set(input.name),
            surname: Set(input.surname),
            birth: Set(input.birth),
            sex: Set(input.sex),
            age: Set(input.age),
        };

        donor.insert(self.conn()).await.map_err(Into::into)
    }

    /// Donors for the biological data form, by surname then name
    pub async fn donor_options(&self) -> Result<Vec<PersonOption>> {
        DonorEntity::find()
            .select_only()
            .column(DonorColumn::Cf)
            .column(DonorColumn::Name)
            .column(DonorColumn::Surname)
            .order_by_asc(DonorColumn::Surname)
            .order_by_asc(DonorColumn::Name)
            .into_model::<PersonOption>()
            .all(self.conn())
            .await
            .map_err(Into::into)
    }

    // ========================================================================
    // Researchers
    // ========================================================================

    pub async fn list_researchers(&self) -> Result<Vec<Researcher>> {
        ResearcherEntity::find()
            .order_by_asc(ResearcherColumn::Surname)
            .order_by_asc(ResearcherColumn::Name)
            .all(self.conn())
            .await
            .map_err(Into::into)
    }

    pub async fn create_researcher(&self, input: NewResearcher) -> Result<Researcher> {
        let researcher = ResearcherActiveModel {
            cf: Set(input.cf),
            name: Set(input.name),
            surname: Set(input.surname),
            birth: Set(input.birth),
        };

        researcher.insert(self.conn()).await.map_err(Into::into)
    }

    /// Researchers for the writes form, by name
    pub async fn researcher_options(&self) -> Result<Vec<PersonOption>> {
        ResearcherEntity::find()
            .select_only()
            .column(ResearcherColumn::Cf)
            .column(ResearcherColumn::Name)
            .column(ResearcherColumn::Surname)
            .order_by_asc(ResearcherColumn::Name)
            .into_model::<PersonOption>()
            .all(self.conn())
            .await
            .map_err(Into::into)
    }

    // ========================================================================
    // Diseases
    // ========================================================================

    pub async fn list_diseases(&self) -> Result<Vec<Disease>> {
        DiseaseEntity::find()
            .order_by_asc(DiseaseColumn::Name)
            .all(self.conn())
            .await
            .map_err(Into::into)
    }

    pub async fn create_disease(&self, input: NewDisease) -> Result<Disease> {
        let disease = DiseaseActiveModel {
            id: NotSet,
            name: Set(input.name),
            discovery_date: Set(input.discovery_date),
            description: Set(input.description),
        };

        disease.insert(self.conn()).await.map_err(Into::into)
    }

    pub async fn disease_options(&self) -> Result<Vec<NamedOption>> {
        DiseaseEntity::find()
            .select_only()
            .column(DiseaseColumn::Id)
            .column(DiseaseColumn::Name)
            .order_by_asc(DiseaseColumn::Name)
            .into_model::<NamedOption>()
            .all(self.conn())
            .await
            .map_err(Into::into)
    }

    // ========================================================================
    // Biological Data
    // ========================================================================

    pub async fn list_biological_data(&self) -> Result<Vec<BiologicalData>> {
        BiologicalDataEntity::find()
            .order_by_asc(BiologicalDataColumn::Id)
            .all(self.conn())
            .await
            .map_err(Into::into)
    }

    /// Record a sample through the `record_biological_data` procedure.
    ///
    /// The id is drawn from the table's identity sequence and passed as the
    /// first of the procedure's nine positional arguments. Returns that id.
    pub async fn record_biological_data(&self, input: NewBiologicalData) -> Result<i32> {
        let txn = self.conn().begin().await?;

        let row = txn
            .query_one(Statement::from_string(
                DbBackend::Postgres,
                "SELECT nextval(pg_get_serial_sequence('biological_data', 'id'))::int4 AS id",
            ))
            .await?
            .ok_or_else(|| AppError::Internal {
                message: "biological_data id sequence returned no value".to_string(),
            })?;
        let id: i32 = row.try_get("", "id")?;

        txn.execute(Statement::from_sql_and_values(
            DbBackend::Postgres,
            "CALL record_biological_data($1, $2, $3, $4, $5, $6, $7, $8, $9)",
            vec![
                id.into(),
                input.name.into(),
                input.condition.into(),
                input.is_required.into(),
                input.description.into(),
                input.position.into(),
                input.data_type.into(),
                input.density.into(),
                input.donor_cf.into(),
            ],
        ))
        .await?;

        txn.commit().await?;
        Ok(id)
    }

    /// Diseased samples (condition `disease`, any case), each with the names
    /// of the diseases already linked to it, by name.
    pub async fn diseased_biological_data_options(&self) -> Result<Vec<BiologicalDataOption>> {
        BiologicalDataOption::find_by_statement(Statement::from_string(
            DbBackend::Postgres,
            r#"
            SELECT b.id,
                   b.name,
                   b.condition,
                   string_agg(d.name, ', ' ORDER BY d.name) AS diseases
            FROM biological_data b
            LEFT JOIN affected a ON a.biological_data_id = b.id
            LEFT JOIN diseases d ON d.id = a.disease_id
            WHERE LOWER(b.condition) = 'disease'
            GROUP BY b.id, b.name, b.condition
            ORDER BY b.name
            "#,
        ))
        .all(self.conn())
        .await
        .map_err(Into::into)
    }

    // ========================================================================
    // Treatments
    // ========================================================================

    pub async fn list_treatments(&self) -> Result<Vec<Treatment>> {
        TreatmentEntity::find()
            .order_by_asc(TreatmentColumn::Name)
            .all(self.conn())
            .await
            .map_err(Into::into)
    }

    pub async fn create_treatment(&self, input: NewTreatment) -> Result<Treatment> {
        let treatment = TreatmentActiveModel {
            id: NotSet,
            name: Set(input.name),
            success_percentage: Set(input.success_percentage),
        };

        treatment.insert(self.conn()).await.map_err(Into::into)
    }

    pub async fn treatment_options(&self) -> Result<Vec<NamedOption>> {
        TreatmentEntity::find()
            .select_only()
            .column(TreatmentColumn::Id)
            .column(TreatmentColumn::Name)
            .order_by_asc(TreatmentColumn::Name)
            .into_model::<NamedOption>()
            .all(self.conn())
            .await
            .map_err(Into::into)
    }

    // ========================================================================
    // Drugs
    // ========================================================================

    pub async fn list_drugs(&self) -> Result<Vec<Drug>> {
        DrugEntity::find()
            .order_by_asc(DrugColumn::Name)
            .all(self.conn())
            .await
            .map_err(Into::into)
    }

    pub async fn create_drug(&self, input: NewDrug) -> Result<Drug> {
        let drug = DrugActiveModel {
            id: NotSet,
            name: Set(input.name),
            description: Set(input.description),
        };

        drug.insert(self.conn()).await.map_err(Into::into)
    }

    pub async fn drug_options(&self) -> Result<Vec<NamedOption>> {
        DrugEntity::find()
            .select_only()
            .column(DrugColumn::Id)
            .column(DrugColumn::Name)
            .order_by_asc(DrugColumn::Name)
            .into_model::<NamedOption>()
            .all(self.conn())
            .await
            .map_err(Into::into)
    }

    // ========================================================================
    // Publications
    // ========================================================================

    pub async fn list_publications(&self) -> Result<Vec<Publication>> {
        PublicationEntity::find()
            .order_by_asc(PublicationColumn::Title)
            .all(self.conn())
            .await
            .map_err(Into::into)
    }

    pub async fn create_publication(&self, input: NewPublication) -> Result<Publication> {
        let publication = PublicationActiveModel {
            doi: Set(input.doi),
            publisher: Set(input.publisher),
            quality: Set(input.quality),
            title: Set(input.title),
        };

        publication.insert(self.conn()).await.map_err(Into::into)
    }

    pub async fn publication_options(&self) -> Result<Vec<PublicationOption>> {
        PublicationEntity::find()
            .select_only()
            .column(PublicationColumn::Doi)
            .column(PublicationColumn::Title)
            .order_by_asc(PublicationColumn::Title)
            .into_model::<PublicationOption>()
            .all(self.conn())
            .await
            .map_err(Into::into)
    }

    // ========================================================================
    // Allergies
    // ========================================================================

    pub async fn list_allergies(&self) -> Result<Vec<Allergy>> {
        AllergyEntity::find()
            .order_by_asc(AllergyColumn::Name)
            .all(self.conn())
            .await
            .map_err(Into::into)
    }

    pub async fn create_allergy(&self, input: NewAllergy) -> Result<Allergy> {
        let allergy = AllergyActiveModel {
            id: NotSet,
            name: Set(input.name),
        };

        allergy.insert(self.conn()).await.map_err(Into::into)
    }

    pub async fn allergy_options(&self) -> Result<Vec<NamedOption>> {
        AllergyEntity::find()
            .select_only()
            .column(AllergyColumn::Id)
            .column(AllergyColumn::Name)
            .order_by_asc(AllergyColumn::Name)
            .into_model::<NamedOption>()
            .all(self.conn())
            .await
            .map_err(Into::into)
    }

    // ========================================================================
    // Experiments
    // ========================================================================

    /// Most recent first
    pub async fn list_experiments(&self) -> Result<Vec<Experiment>> {
        ExperimentEntity::find()
            .order_by_desc(ExperimentColumn::ExperDate)
            .order_by_desc(ExperimentColumn::Id)
            .all(self.conn())
            .await
            .map_err(Into::into)
    }

    /// Insert an experiment, resolving disease and treatment in the same
    /// statement. Fails with `MissingReference` when either does not exist.
    pub async fn create_experiment(&self, input: NewExperiment) -> Result<i32> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            r#"
            INSERT INTO experiments (exper_date, is_positive, effect_description, disease_id, treatment_id)
            SELECT $1::date, $2::boolean, $3::text, d.id, t.id
            FROM diseases d, treatments t
            WHERE d.id = $4 AND t.id = $5
            RETURNING id
            "#,
            vec![
                input.exper_date.into(),
                input.is_positive.into(),
                input.effect_description.into(),
                input.disease_id.into(),
                input.treatment_id.into(),
            ],
        );

        self.insert_returning_id(stmt, || {
            format!(
                "disease {} or treatment {} does not exist",
                input.disease_id, input.treatment_id
            )
        })
        .await
    }

    pub async fn experiment_options(&self) -> Result<Vec<ExperimentOption>> {
        ExperimentEntity::find()
            .select_only()
            .column(ExperimentColumn::Id)
            .column(ExperimentColumn::ExperDate)
            .order_by_desc(ExperimentColumn::ExperDate)
            .into_model::<ExperimentOption>()
            .all(self.conn())
            .await
            .map_err(Into::into)
    }

    /// Experiments with the disease they study, most recent first
    pub async fn experiment_disease_options(&self) -> Result<Vec<ExperimentDiseaseOption>> {
        ExperimentDiseaseOption::find_by_statement(Statement::from_string(
            DbBackend::Postgres,
            r#"
            SELECT e.id,
                   e.exper_date,
                   d.id AS disease_id,
                   d.name AS disease_name
            FROM experiments e
            JOIN diseases d ON d.id = e.disease_id
            ORDER BY e.exper_date DESC
            "#,
        ))
        .all(self.conn())
        .await
        .map_err(Into::into)
    }

    // ========================================================================
    // Future Works
    // ========================================================================

    pub async fn list_future_works(&self) -> Result<Vec<FutureWork>> {
        FutureWorkEntity::find()
            .order_by_asc(FutureWorkColumn::Id)
            .all(self.conn())
            .await
            .map_err(Into::into)
    }

    pub async fn create_future_work(&self, input: NewFutureWork) -> Result<i32> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            r#"
            INSERT INTO future_works (title, experiment_id, publication_doi)
            SELECT $1::text, e.id, p.doi
            FROM experiments e, publications p
            WHERE e.id = $2 AND p.doi = $3
            RETURNING id
            "#,
            vec![
                input.title.into(),
                input.experiment_id.into(),
                input.publication_doi.clone().into(),
            ],
        );

        self.insert_returning_id(stmt, || {
            format!(
                "experiment {} or publication {} does not exist",
                input.experiment_id, input.publication_doi
            )
        })
        .await
    }

    // ========================================================================
    // Association Links
    // ========================================================================

    /// Insert one of the five link rows. Both ends are looked up in the
    /// insert itself; when either is missing nothing is written.
    pub async fn create_link(&self, link: NewLink) -> Result<i32> {
        let (sql, values): (&str, Vec<sea_orm::Value>) = match &link {
            NewLink::Assign { treatment_id, drug_id } => (
                r#"
                INSERT INTO assigns (treatment_id, drug_id)
                SELECT t.id, d.id FROM treatments t, drugs d
                WHERE t.id = $1 AND d.id = $2
                RETURNING id
                "#,
                vec![(*treatment_id).into(), (*drug_id).into()],
            ),
            NewLink::Writes { researcher_cf, publication_doi } => (
                r#"
                INSERT INTO writes (researcher_cf, publication_doi)
                SELECT r.cf, p.doi FROM researchers r, publications p
                WHERE r.cf = $1 AND p.doi = $2
                RETURNING id
                "#,
                vec![researcher_cf.clone().into(), publication_doi.clone().into()],
            ),
            NewLink::Affected { biological_data_id, disease_id } => (
                r#"
                INSERT INTO affected (biological_data_id, disease_id)
                SELECT b.id, d.id FROM biological_data b, diseases d
                WHERE b.id = $1 AND d.id = $2
                RETURNING id
                "#,
                vec![(*biological_data_id).into(), (*disease_id).into()],
            ),
            NewLink::Cause { drug_id, allergy_id } => (
                r#"
                INSERT INTO causes (drug_id, allergy_id)
                SELECT d.id, a.id FROM drugs d, allergies a
                WHERE d.id = $1 AND a.id = $2
                RETURNING id
                "#,
                vec![(*drug_id).into(), (*allergy_id).into()],
            ),
            NewLink::Analyze { biological_data_id, experiment_id } => (
                r#"
                INSERT INTO analyses (biological_data_id, experiment_id)
                SELECT b.id, e.id FROM biological_data b, experiments e
                WHERE b.id = $1 AND e.id = $2
                RETURNING id
                "#,
                vec![(*biological_data_id).into(), (*experiment_id).into()],
            ),
        };

        let stmt = Statement::from_sql_and_values(DbBackend::Postgres, sql, values);
        self.insert_returning_id(stmt, || link.describe_refs()).await
    }

    pub async fn list_assign(&self) -> Result<Vec<AssignRow>> {
        self.fetch_rows(
            r#"
            SELECT a.id,
                   t.id AS treatment_id, t.name AS treatment_name,
                   d.id AS drug_id, d.name AS drug_name
            FROM assigns a
            JOIN treatments t ON t.id = a.treatment_id
            JOIN drugs d ON d.id = a.drug_id
            ORDER BY a.id
            "#,
        )
        .await
    }

    pub async fn list_writes(&self) -> Result<Vec<WritesRow>> {
        self.fetch_rows(
            r#"
            SELECT w.id,
                   r.cf AS researcher_cf, r.name AS researcher_name, r.surname AS researcher_surname,
                   p.doi AS publication_doi, p.title AS publication_title
            FROM writes w
            JOIN researchers r ON r.cf = w.researcher_cf
            JOIN publications p ON p.doi = w.publication_doi
            ORDER BY w.id
            "#,
        )
        .await
    }

    pub async fn list_affected(&self) -> Result<Vec<AffectedRow>> {
        self.fetch_rows(
            r#"
            SELECT a.id,
                   b.id AS biological_data_id, b.name AS biological_data_name,
                   d.id AS disease_id, d.name AS disease_name
            FROM affected a
            JOIN biological_data b ON b.id = a.biological_data_id
            JOIN diseases d ON d.id = a.disease_id
            ORDER BY a.id
            "#,
        )
        .await
    }

    pub async fn list_cause(&self) -> Result<Vec<CauseRow>> {
        self.fetch_rows(
            r#"
            SELECT c.id,
                   d.id AS drug_id, d.name AS drug_name,
                   a.id AS allergy_id, a.name AS allergy_name
            FROM causes c
            JOIN drugs d ON d.id = c.drug_id
            JOIN allergies a ON a.id = c.allergy_id
            ORDER BY c.id
            "#,
        )
        .await
    }

    pub async fn list_analyze(&self) -> Result<Vec<AnalyzeRow>> {
        self.fetch_rows(
            r#"
            SELECT an.id,
                   b.id AS biological_data_id, b.name AS biological_data_name,
                   e.id AS experiment_id, e.exper_date AS experiment_date
            FROM analyses an
            JOIN biological_data b ON b.id = an.biological_data_id
            JOIN experiments e ON e.id = an.experiment_id
            ORDER BY an.id
            "#,
        )
        .await
    }

    // ========================================================================
    // Reports
    // ========================================================================

    pub async fn run_report(&self, report: &Report) -> Result<ReportTable> {
        report.run(self.conn()).await
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    async fn fetch_rows<T>(&self, sql: &str) -> Result<Vec<T>>
    where
        T: FromQueryResult,
    {
        T::find_by_statement(Statement::from_string(DbBackend::Postgres, sql))
            .all(self.conn())
            .await
            .map_err(Into::into)
    }

    /// Run an `INSERT ... SELECT ... RETURNING id`. No returned row means the
    /// reference lookup matched nothing.
    async fn insert_returning_id<F>(&self, stmt: Statement, missing: F) -> Result<i32>
    where
        F: FnOnce() -> String,
    {
        match self.conn().query_one(stmt).await? {
            Some(row) => Ok(row.try_get("", "id")?),
            None => Err(AppError::MissingReference { message: missing() }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Value};
    use std::collections::BTreeMap;
    use std::sync::Arc;
    use tokio_test::{assert_err, assert_ok};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn repo(conn: &Arc<DatabaseConnection>) -> Repository {
        Repository::new(DbPool::from_shared(Arc::clone(conn)))
    }

    fn mock(db: MockDatabase) -> Arc<DatabaseConnection> {
        Arc::new(db.into_connection())
    }

    /// Statements issued so far; every repository using `conn` must be gone.
    fn statements(conn: Arc<DatabaseConnection>) -> String {
        let conn = Arc::try_unwrap(conn).expect("connection still shared");
        format!("{:?}", conn.into_transaction_log())
    }

    fn id_row(id: i32) -> BTreeMap<&'static str, Value> {
        BTreeMap::from([("id", Value::Int(Some(id)))])
    }

    fn no_rows() -> Vec<BTreeMap<&'static str, Value>> {
        Vec::new()
    }

    #[tokio::test]
    async fn test_list_donors_orders_by_surname_then_name() {
        let rossi = Donor {
            cf: "RSSMRA80A01H501U".into(),
            name: "Mario".into(),
            surname: "Rossi".into(),
            birth: date(1980, 1, 1),
            sex: "M".into(),
            age: 45,
        };
        let conn = mock(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![rossi.clone()]]),
        );

        let donors = assert_ok!(repo(&conn).list_donors().await);
        assert_eq!(donors, vec![rossi]);

        let log = statements(conn);
        let surname = log.find("\\\"surname\\\" ASC").expect("ordered by surname");
        let name = log.rfind("\\\"name\\\" ASC").expect("ordered by name");
        assert!(surname < name);
    }

    #[tokio::test]
    async fn test_create_disease_returns_generated_id() {
        let stored = Disease {
            id: 4,
            name: "Cystic fibrosis".into(),
            discovery_date: date(1938, 1, 1),
            description: None,
        };
        let conn = mock(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![stored.clone()]]),
        );

        let created = repo(&conn)
            .create_disease(NewDisease {
                name: "Cystic fibrosis".into(),
                discovery_date: date(1938, 1, 1),
                description: None,
            })
            .await
            .unwrap();

        assert_eq!(created.id, 4);
    }

    #[tokio::test]
    async fn test_create_link_returns_new_id() {
        let conn = mock(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![id_row(7)]]),
        );

        let id = assert_ok!(
            repo(&conn)
                .create_link(NewLink::Assign { treatment_id: 1, drug_id: 2 })
                .await
        );
        assert_eq!(id, 7);

        let log = statements(conn);
        assert!(log.contains("INSERT INTO assigns"));
        assert!(log.contains("FROM treatments t, drugs d"));
    }

    #[tokio::test]
    async fn test_create_link_with_missing_reference_inserts_nothing() {
        let conn = mock(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([no_rows()]),
        );

        let err = assert_err!(
            repo(&conn)
                .create_link(NewLink::Cause { drug_id: 3, allergy_id: 999 })
                .await
        );

        match err {
            AppError::MissingReference { message } => {
                assert_eq!(message, "drug 3 or allergy 999 does not exist")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_create_experiment_with_unknown_disease() {
        let conn = mock(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([no_rows()]),
        );

        let err = repo(&conn)
            .create_experiment(NewExperiment {
                exper_date: date(2024, 5, 2),
                is_positive: true,
                effect_description: None,
                disease_id: 42,
                treatment_id: 1,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::MissingReference { .. }));
    }

    #[tokio::test]
    async fn test_record_biological_data_calls_procedure_with_sequence_id() {
        let conn = mock(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![id_row(12)]])
                .append_exec_results([MockExecResult { last_insert_id: 0, rows_affected: 1 }]),
        );

        let id = repo(&conn)
            .record_biological_data(NewBiologicalData {
                name: "Liver".into(),
                condition: "disease".into(),
                is_required: true,
                description: Some("biopsy".into()),
                position: "abdomen".into(),
                data_type: "tissue".into(),
                density: 1.05,
                donor_cf: "RSSMRA80A01H501U".into(),
            })
            .await
            .unwrap();
        assert_eq!(id, 12);

        let log = statements(conn);
        assert!(log.contains("pg_get_serial_sequence"));
        assert!(log.contains("CALL record_biological_data($1, $2, $3, $4, $5, $6, $7, $8, $9)"));
    }

    #[tokio::test]
    async fn test_create_future_work_with_unknown_publication() {
        let conn = mock(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([no_rows()]),
        );

        let err = assert_err!(
            repo(&conn)
                .create_future_work(NewFutureWork {
                    title: "Follow-up".into(),
                    experiment_id: 3,
                    publication_doi: "10.1000/182".into(),
                })
                .await
        );
        assert_eq!(
            err.to_string(),
            "Referenced record not found: experiment 3 or publication 10.1000/182 does not exist"
        );

        let log = statements(conn);
        assert!(log.contains("INSERT INTO future_works"));
        assert!(log.contains("WHERE e.id = $2 AND p.doi = $3"));
    }
}
