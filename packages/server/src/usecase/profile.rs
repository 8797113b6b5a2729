//! UseCase: 学生・ドライバーのプロフィール管理
//!
//! プロフィールは外部データストア（`UserDirectory`）が保持し、
//! このユースケースは HTTP API からの登録・検索をデータストアに委譲します。

use std::sync::Arc;

use crate::domain::{Driver, NewDriver, NewStudent, Student, UserDirectory};

use super::error::CoordinatorError;

/// プロフィール管理のユースケース
pub struct ProfileUseCase {
    directory: Arc<dyn UserDirectory>,
}

impl ProfileUseCase {
    pub fn new(directory: Arc<dyn UserDirectory>) -> Self {
        Self { directory }
    }

    pub async fn register_student(&self, new: NewStudent) -> Result<Student, CoordinatorError> {
        let student = self.directory.create_student(new).await?;
        tracing::info!("Student '{}' registered ({})", student.id, student.email);
        Ok(student)
    }

    pub async fn register_driver(&self, new: NewDriver) -> Result<Driver, CoordinatorError> {
        let driver = self.directory.create_driver(new).await?;
        tracing::info!(
            "Driver '{}' registered ({}, {})",
            driver.id,
            driver.phone,
            driver.vehicle_number
        );
        Ok(driver)
    }

    pub async fn list_students(&self) -> Vec<Student> {
        self.directory.list_students().await
    }

    pub async fn list_drivers(&self) -> Vec<Driver> {
        self.directory.list_drivers().await
    }

    pub async fn find_student(&self, id: &str) -> Result<Student, CoordinatorError> {
        self.directory
            .get_student(id)
            .await
            .ok_or_else(|| CoordinatorError::NotFound(format!("student '{id}' not found")))
    }

    pub async fn find_driver(&self, id: &str) -> Result<Driver, CoordinatorError> {
        self.directory
            .get_driver(id)
            .await
            .ok_or_else(|| CoordinatorError::NotFound(format!("driver '{id}' not found")))
    }

    pub async fn find_student_by_email(&self, email: &str) -> Result<Student, CoordinatorError> {
        self.directory
            .get_student_by_email(email)
            .await
            .ok_or_else(|| CoordinatorError::NotFound(format!("student '{email}' not found")))
    }

    pub async fn find_driver_by_phone(&self, phone: &str) -> Result<Driver, CoordinatorError> {
        self.directory
            .get_driver_by_phone(phone)
            .await
            .ok_or_else(|| CoordinatorError::NotFound(format!("driver '{phone}' not found")))
    }

    pub async fn find_driver_by_email(&self, email: &str) -> Result<Driver, CoordinatorError> {
        self.directory
            .get_driver_by_email(email)
            .await
            .ok_or_else(|| CoordinatorError::NotFound(format!("driver '{email}' not found")))
    }

    /// ドライバーのオンライン状態を更新
    pub async fn set_driver_status(
        &self,
        driver_id: &str,
        is_online: bool,
    ) -> Result<Driver, CoordinatorError> {
        Ok(self
            .directory
            .update_driver_availability(driver_id, is_online)
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::repository::InMemoryUserDirectory;

    fn create_usecase() -> ProfileUseCase {
        ProfileUseCase::new(Arc::new(InMemoryUserDirectory::new()))
    }

    fn new_student(email: &str) -> NewStudent {
        NewStudent {
            name: "Nadia".to_string(),
            email: email.to_string(),
            student_id: "1804001".to_string(),
            phone: "01800000001".to_string(),
            department: "CSE".to_string(),
        }
    }

    fn new_driver(phone: &str, vehicle_number: &str) -> NewDriver {
        NewDriver {
            name: "Karim".to_string(),
            email: format!("{phone}@example.com"),
            phone: phone.to_string(),
            vehicle_type: "rickshaw".to_string(),
            vehicle_number: vehicle_number.to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_and_find_student() {
        // テスト項目: 登録した学生を email で検索できる
        // given (前提条件):
        let usecase = create_usecase();
        let student = usecase
            .register_student(new_student("nadia@example.com"))
            .await
            .unwrap();

        // when (操作):
        let found = usecase.find_student_by_email("nadia@example.com").await;

        // then (期待する結果):
        assert_eq!(found, Ok(student));
        assert_eq!(usecase.list_students().await.len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_student_email_conflicts() {
        // テスト項目: 同じ email の学生は登録できない
        // given (前提条件):
        let usecase = create_usecase();
        usecase
            .register_student(new_student("nadia@example.com"))
            .await
            .unwrap();

        // when (操作):
        let result = usecase
            .register_student(new_student("nadia@example.com"))
            .await;

        // then (期待する結果):
        assert!(matches!(result, Err(CoordinatorError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_duplicate_vehicle_number_conflicts() {
        // テスト項目: 同じ車両番号のドライバーは登録できない
        // given (前提条件):
        let usecase = create_usecase();
        usecase
            .register_driver(new_driver("01700000001", "RK-101"))
            .await
            .unwrap();

        // when (操作):
        let result = usecase
            .register_driver(new_driver("01700000002", "RK-101"))
            .await;

        // then (期待する結果):
        assert!(matches!(result, Err(CoordinatorError::Conflict(_))));
        assert_eq!(usecase.list_drivers().await.len(), 1);
    }

    #[tokio::test]
    async fn test_set_driver_status() {
        // テスト項目: ドライバーのオンライン状態を更新でき、未登録のドライバーは NotFound
        // given (前提条件):
        let usecase = create_usecase();
        let driver = usecase
            .register_driver(new_driver("01700000001", "RK-101"))
            .await
            .unwrap();

        // when (操作):
        let updated = usecase.set_driver_status(&driver.id, true).await.unwrap();
        let missing = usecase.set_driver_status("unknown", true).await;

        // then (期待する結果):
        assert!(updated.is_online);
        assert!(matches!(missing, Err(CoordinatorError::NotFound(_))));
        let by_phone = usecase.find_driver_by_phone("01700000001").await.unwrap();
        assert!(by_phone.is_online);
    }

    #[tokio::test]
    async fn test_find_by_id() {
        // テスト項目: 登録した学生・ドライバーを ID で取得でき、未知の ID は NotFound
        // given (前提条件):
        let usecase = create_usecase();
        let student = usecase
            .register_student(new_student("nadia@example.com"))
            .await
            .unwrap();
        let driver = usecase
            .register_driver(new_driver("01811111111", "DHA-1"))
            .await
            .unwrap();

        // when (操作):
        let found_student = usecase.find_student(&student.id).await;
        let found_driver = usecase.find_driver(&driver.id).await;
        let missing_student = usecase.find_student(&driver.id).await;
        let missing_driver = usecase.find_driver("unknown").await;

        // then (期待する結果):
        assert_eq!(found_student.unwrap().email, "nadia@example.com");
        assert_eq!(found_driver.unwrap().phone, "01811111111");
        assert!(matches!(missing_student, Err(CoordinatorError::NotFound(_))));
        assert!(matches!(missing_driver, Err(CoordinatorError::NotFound(_))));
    }
}
