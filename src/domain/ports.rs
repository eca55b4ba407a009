use crate::domain::model::{
    Availability, Booking, BookingRequest, Destination, QuoteRecord, WindowQuery,
};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait ConfigProvider: Send + Sync {
    fn supabase_url(&self) -> &str;
    fn supabase_key(&self) -> &str;
    fn request_timeout_seconds(&self) -> u64;
    fn catalog_path(&self) -> Option<&str>;
}

/// 目的地資料表的讀取介面
#[async_trait]
pub trait DestinationRepository: Send + Sync {
    /// 依國家名稱排序的啟用中目的地
    async fn list_active_destinations(&self) -> Result<Vec<Destination>>;

    /// 找不到或已停用時回傳 `None`
    async fn find_active_destination(&self, id: &str) -> Result<Option<Destination>> {
        Ok(self
            .list_active_destinations()
            .await?
            .into_iter()
            .find(|d| d.id == id))
    }
}

#[async_trait]
pub trait QuoteStore: Send + Sync {
    async fn save_quote(&self, quote: &QuoteRecord) -> Result<QuoteRecord>;
}

/// 外部容量服務；衝突偵測與冪等鍵去重都在服務端處理
#[async_trait]
pub trait BookingService: Send + Sync {
    async fn list_windows(&self, query: &WindowQuery) -> Result<Availability>;
    async fn create_booking(&self, request: &BookingRequest) -> Result<Booking>;
}
