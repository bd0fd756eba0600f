use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use crate::errors::Result;
use crate::models::NewsArticle;

#[derive(Default)]
struct NewsState {
    articles: Vec<NewsArticle>,
    regional: HashMap<String, Vec<NewsArticle>>,
    trending: HashMap<String, u64>,
}

#[derive(Clone)]
pub struct NewsFeedHolder {
    state: Arc<Mutex<NewsState>>,
}

impl NewsFeedHolder {
    pub fn new() -> Self {
        NewsFeedHolder {
            state: Arc::new(Mutex::new(NewsState::default())),
        }
    }

    pub async fn add_article(&self, region: &str, article: NewsArticle) -> Result<()> {
        let mut state = self.state.lock().await;
        state
            .regional
            .entry(region.to_string())
            .or_default()
            .push(article.clone());
        state.articles.push(article);
        Ok(())
    }

    pub async fn articles(&self) -> Result<Vec<NewsArticle>> {
        let state = self.state.lock().await;
        Ok(state.articles.clone())
    }

    pub async fn regional(&self) -> Result<HashMap<String, Vec<NewsArticle>>> {
        let state = self.state.lock().await;
        Ok(state.regional.clone())
    }

    pub async fn set_trending(&self, trending: HashMap<String, u64>) -> Result<()> {
        let mut state = self.state.lock().await;
        state.trending = trending;
        Ok(())
    }

    pub async fn trending(&self) -> Result<HashMap<String, u64>> {
        let state = self.state.lock().await;
        Ok(state.trending.clone())
    }

    pub async fn clear(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        state.articles.clear();
        state.regional.clear();
        state.trending.clear();
        Ok(())
    }

    pub async fn article_count(&self) -> Result<usize> {
        let state = self.state.lock().await;
        Ok(state.articles.len())
    }
}
