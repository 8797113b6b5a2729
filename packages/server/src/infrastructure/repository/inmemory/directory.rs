//! InMemory UserDirectory 実装
//!
//! 学生・ドライバーのプロフィールを登録順の Vec で保持します。
//! email / 学籍番号 / 電話番号 / 車両番号の一意制約に違反する登録は `Conflict` になります。

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::domain::{Driver, NewDriver, NewStudent, RepositoryError, Student, UserDirectory};

#[derive(Default)]
struct Profiles {
    students: Vec<Student>,
    drivers: Vec<Driver>,
}

/// インメモリ UserDirectory 実装
pub struct InMemoryUserDirectory {
    profiles: Arc<Mutex<Profiles>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self {
            profiles: Arc::new(Mutex::new(Profiles::default())),
        }
    }
}

impl Default for InMemoryUserDirectory {
    fn default() -> Self {
        Self::new()
    }
}

fn same(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn create_student(&self, new: NewStudent) -> Result<Student, RepositoryError> {
        let mut profiles = self.profiles.lock().await;
        if profiles
            .students
            .iter()
            .any(|s| same(&s.email, &new.email) || s.student_id == new.student_id)
        {
            return Err(RepositoryError::Conflict(
                "student with this email or student ID already exists".to_string(),
            ));
        }

        let student = Student {
            id: Uuid::new_v4().to_string(),
            name: new.name,
            email: new.email,
            student_id: new.student_id,
            phone: new.phone,
            department: new.department,
            wallet: 0,
            total_rides: 0,
        };
        profiles.students.push(student.clone());
        Ok(student)
    }

    async fn create_driver(&self, new: NewDriver) -> Result<Driver, RepositoryError> {
        let mut profiles = self.profiles.lock().await;
        if profiles.drivers.iter().any(|d| {
            same(&d.email, &new.email)
                || d.phone == new.phone
                || same(&d.vehicle_number, &new.vehicle_number)
        }) {
            return Err(RepositoryError::Conflict(
                "driver with this phone number, vehicle number, or email already exists"
                    .to_string(),
            ));
        }

        let driver = Driver {
            id: Uuid::new_v4().to_string(),
            name: new.name,
            email: new.email,
            phone: new.phone,
            vehicle_type: new.vehicle_type,
            vehicle_number: new.vehicle_number,
            rating: 0.0,
            total_rides: 0,
            is_online: false,
        };
        profiles.drivers.push(driver.clone());
        Ok(driver)
    }

    async fn get_student(&self, id: &str) -> Option<Student> {
        let profiles = self.profiles.lock().await;
        profiles.students.iter().find(|s| s.id == id).cloned()
    }

    async fn get_driver(&self, id: &str) -> Option<Driver> {
        let profiles = self.profiles.lock().await;
        profiles.drivers.iter().find(|d| d.id == id).cloned()
    }

    async fn get_student_by_email(&self, email: &str) -> Option<Student> {
        let profiles = self.profiles.lock().await;
        profiles
            .students
            .iter()
            .find(|s| same(&s.email, email))
            .cloned()
    }

    async fn get_driver_by_phone(&self, phone: &str) -> Option<Driver> {
        let profiles = self.profiles.lock().await;
        profiles.drivers.iter().find(|d| d.phone == phone).cloned()
    }

    async fn get_driver_by_email(&self, email: &str) -> Option<Driver> {
        let profiles = self.profiles.lock().await;
        profiles
            .drivers
            .iter()
            .find(|d| same(&d.email, email))
            .cloned()
    }

    async fn list_students(&self) -> Vec<Student> {
        self.profiles.lock().await.students.clone()
    }

    async fn list_drivers(&self) -> Vec<Driver> {
        self.profiles.lock().await.drivers.clone()
    }

    async fn update_driver_availability(
        &self,
        id: &str,
        is_online: bool,
    ) -> Result<Driver, RepositoryError> {
        let mut profiles = self.profiles.lock().await;
        let driver = profiles
            .drivers
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| RepositoryError::NotFound {
                entity: "driver",
                id: id.to_string(),
            })?;
        driver.is_online = is_online;
        Ok(driver.clone())
    }
}
