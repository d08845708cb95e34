// History service - Use cases for saved weather snapshots
use crate::application::error::{ServiceError, ServiceResult};
use crate::application::history_repository::HistoryRepository;
use crate::application::weather_service::WeatherService;
use crate::domain::forecast::Units;
use crate::domain::history::{decode_data, ConditionsSummary, HistoryRecord, NewHistoryRecord};
use crate::infrastructure::csv_export::history_to_csv;
use chrono::NaiveDate;
use std::sync::Arc;

#[derive(Clone)]
pub struct HistoryService {
    repository: Arc<dyn HistoryRepository>,
    weather: WeatherService,
}

impl HistoryService {
    pub fn new(repository: Arc<dyn HistoryRepository>, weather: WeatherService) -> Self {
        Self { repository, weather }
    }

    pub async fn create(&self, record: NewHistoryRecord) -> ServiceResult<i64> {
        record.validate().map_err(ServiceError::InvalidInput)?;
        let record = NewHistoryRecord {
            city: record.city.trim().to_string(),
            data: decode_data(record.data),
            ..record
        };
        let id = self.repository.create(&record).await?;
        tracing::info!("Saved history record {} for {}", id, record.city);
        Ok(id)
    }

    pub async fn list(&self) -> ServiceResult<Vec<HistoryRecord>> {
        Ok(self.repository.list_all().await?)
    }

    pub async fn get(&self, id: i64) -> ServiceResult<HistoryRecord> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Record not found"))
    }

    pub async fn delete(&self, id: i64) -> ServiceResult<()> {
        if !self.repository.delete_by_id(id).await? {
            return Err(ServiceError::not_found("Record not found"));
        }
        tracing::info!("Deleted history record {}", id);
        Ok(())
    }

    /// Replace a record's snapshot with today's current conditions
    pub async fn refresh(&self, id: i64, units: Units, today: NaiveDate) -> ServiceResult<HistoryRecord> {
        let record = self.get(id).await?;

        let current = match self.weather.current(&record.city, units).await {
            Ok(current) => current,
            Err(ServiceError::NotFound(_)) | Err(ServiceError::InvalidInput(_)) => {
                return Err(ServiceError::Upstream("Failed to fetch current weather".to_string()));
            }
            Err(e) => return Err(e),
        };

        let summary = ConditionsSummary::from_current(&current, units);
        let data = serde_json::to_value(&summary).map_err(anyhow::Error::from)?;

        if !self.repository.update_to_today(id, today, &data).await? {
            // Deleted between the read and the write
            return Err(ServiceError::not_found("Record not found"));
        }
        tracing::info!("Refreshed history record {} for {} to {}", id, record.city, today);

        self.get(id).await
    }

    /// CSV rendering of a record, with its download file name
    pub async fn export_csv(&self, id: i64) -> ServiceResult<(String, Vec<u8>)> {
        let record = self.get(id).await?;
        let body = history_to_csv(&record)?;
        Ok((record.export_file_name(), body))
    }
}
