//! 测试用的脚本化浏览器

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use region_stats_scraper::error::{BrowserError, ExtractError};
use region_stats_scraper::{
    BadgeGroup, BrowserSession, Config, PageCapability, RawFieldSet, SessionLauncher, WorkItem,
};

/// 地区在假页面上的表现
#[derive(Debug, Clone)]
pub enum Behavior {
    Normal,
    /// 徽章组一直停留在占位状态
    NeverRenders,
    /// 数值无法解析
    Malformed,
    /// 模拟进程内未捕获的错误
    Panic,
}

#[derive(Debug, Clone)]
pub struct FakeRegion {
    pub label: String,
    pub behavior: Behavior,
    pub delay: Duration,
}

/// 所有假标签页共享的剧本与计数器
#[derive(Debug, Default)]
pub struct Script {
    pub regions: HashMap<String, FakeRegion>,
    pub failing_tabs: AtomicUsize,
    /// 接下来这么多次启动会 panic
    pub panicking_launches: AtomicUsize,
    pub launches: AtomicUsize,
    pub closes: AtomicUsize,
    pub tabs_opened: AtomicUsize,
    pub tabs_closed: AtomicUsize,
}

impl Script {
    /// `count` 个地区，id 为 `r0..`，名称倒序以便检查排序
    pub fn with_regions(count: usize) -> Self {
        let regions = (0..count)
            .map(|i| {
                let region = FakeRegion {
                    label: format!("Регион {:02}", count - i),
                    behavior: Behavior::Normal,
                    delay: Duration::from_millis(1),
                };
                (format!("r{i}"), region)
            })
            .collect();
        Self {
            regions,
            ..Default::default()
        }
    }

    pub fn set_behavior(&mut self, id: &str, behavior: Behavior) {
        if let Some(region) = self.regions.get_mut(id) {
            region.behavior = behavior;
        }
    }

    pub fn set_delay(&mut self, id: &str, delay: Duration) {
        if let Some(region) = self.regions.get_mut(id) {
            region.delay = delay;
        }
    }

    pub fn label_of(&self, id: &str) -> String {
        self.regions[id].label.clone()
    }
}

pub fn items(count: usize) -> Vec<WorkItem> {
    (0..count).map(|i| WorkItem::new(format!("r{i}"))).collect()
}

pub fn test_config(processes: usize, tabs: usize) -> Config {
    Config {
        num_processes: processes,
        tabs_per_process: tabs,
        wait_timeout_ms: 50,
        ..Config::default()
    }
}

#[derive(Clone)]
pub struct FakeLauncher {
    pub script: Arc<Script>,
}

impl FakeLauncher {
    pub fn new(script: Script) -> Self {
        Self {
            script: Arc::new(script),
        }
    }
}

#[async_trait]
impl SessionLauncher for FakeLauncher {
    type Session = FakeSession;

    async fn launch(&self) -> Result<FakeSession, BrowserError> {
        self.script.launches.fetch_add(1, Ordering::SeqCst);
        let panicking = self.script.panicking_launches.fetch_update(
            Ordering::SeqCst,
            Ordering::SeqCst,
            |n| n.checked_sub(1),
        );
        if panicking.is_ok() {
            panic!("browser failed to start");
        }
        Ok(FakeSession {
            script: self.script.clone(),
        })
    }
}

pub struct FakeSession {
    script: Arc<Script>,
}

#[async_trait]
impl BrowserSession for FakeSession {
    type Tab = FakeTab;

    async fn open_tab(&self) -> Result<FakeTab, ExtractError> {
        tokio::task::yield_now().await;
        let remaining = self.script.failing_tabs.load(Ordering::SeqCst);
        if remaining > 0 {
            self.script.failing_tabs.store(remaining - 1, Ordering::SeqCst);
            return Err(ExtractError::Timeout {
                group: "regions".to_string(),
                timeout_ms: 50,
            });
        }
        self.script.tabs_opened.fetch_add(1, Ordering::SeqCst);
        Ok(FakeTab {
            script: self.script.clone(),
            focused: Mutex::new(None),
        })
    }

    async fn close(self) -> Result<(), BrowserError> {
        self.script.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub struct FakeTab {
    script: Arc<Script>,
    focused: Mutex<Option<FakeRegion>>,
}

#[async_trait]
impl PageCapability for FakeTab {
    async fn bring_into_focus(&self, item: &WorkItem) -> Result<String, ExtractError> {
        let region = self
            .script
            .regions
            .get(item.id())
            .cloned()
            .ok_or_else(|| ExtractError::not_found(format!("[id=\"{item}\"]")))?;
        tokio::time::sleep(region.delay).await;
        if let Behavior::Panic = region.behavior {
            panic!("page crashed on {}", item);
        }
        let label = region.label.clone();
        *self.focused.lock().unwrap() = Some(region);
        Ok(label)
    }

    async fn read_group(&self, group: &BadgeGroup) -> Result<RawFieldSet, ExtractError> {
        tokio::task::yield_now().await;
        let region = self
            .focused
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| ExtractError::not_found(&group.value))?;
        let (key, value) = match (&region.behavior, group.name.as_str()) {
            (Behavior::NeverRenders, _) => ("Вакансии", "-".to_string()),
            (Behavior::Malformed, "bottom_bar") => ("Резюме", "n/a".to_string()),
            (_, "sidebar") => ("Вакансии", "1 024".to_string()),
            _ => ("Доля", "12.5%".to_string()),
        };
        Ok(RawFieldSet::from([(key.to_string(), value)]))
    }

    async fn close(&self) -> Result<(), ExtractError> {
        self.script.tabs_closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
