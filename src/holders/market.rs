use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use crate::errors::Result;
use crate::models::TickerMarketData;

#[derive(Clone)]
pub struct MarketDataHolder {
    data: Arc<Mutex<HashMap<String, TickerMarketData>>>,
}

impl MarketDataHolder {
    pub fn new() -> Self {
        MarketDataHolder {
            data: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub async fn insert(&self, ticker: &str, market_data: TickerMarketData) -> Result<()> {
        let mut data = self.data.lock().await;
        data.insert(ticker.to_string(), market_data);
        Ok(())
    }

    pub async fn get(&self, ticker: &str) -> Result<Option<TickerMarketData>> {
        let data = self.data.lock().await;
        Ok(data.get(ticker).cloned())
    }

    pub async fn clear(&self) -> Result<()> {
        let mut data = self.data.lock().await;
        data.clear();
        Ok(())
    }

    pub async fn len(&self) -> Result<usize> {
        let data = self.data.lock().await;
        Ok(data.len())
    }
}
