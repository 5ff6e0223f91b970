// Example: page through an in-memory log source, then narrow it with a filter.
use async_trait::async_trait;
use lazylist::{
    ElementId, FetchError, Filters, Footer, ListController, ListOptions, Node, ObserverHost,
    PageFetcher, PageRequest, RenderSurface, RenderedItem, ScrollMetrics, Watch, WatchOptions,
};
use serde_json::{Value, json};

#[derive(Clone, Debug, serde::Deserialize)]
struct LogEntry {
    id: u32,
    level: String,
}

struct InMemory(Vec<(u32, &'static str)>);

#[async_trait]
impl PageFetcher for InMemory {
    async fn fetch(&self, request: PageRequest) -> Result<Value, FetchError> {
        let level = request.filters.get("level");
        let matching: Vec<_> = self
            .0
            .iter()
            .filter(|(_, l)| level.is_none_or(|level| level == *l))
            .collect();
        let items: Vec<Value> = matching
            .iter()
            .skip((request.page - 1) * request.limit)
            .take(request.limit)
            .map(|(id, level)| json!({ "id": id, "level": level }))
            .collect();
        Ok(json!({ "items": items, "total": matching.len() }))
    }
}

#[derive(Default)]
struct PrintSurface {
    rows: usize,
    next_id: u64,
}

impl RenderSurface for PrintSurface {
    fn append_items(&mut self, items: Vec<RenderedItem>) -> Vec<ElementId> {
        items
            .into_iter()
            .map(|item| {
                println!("  [{}] {}", item.index, item.node.text_content());
                self.rows += 1;
                self.next_id += 1;
                ElementId(self.next_id)
            })
            .collect()
    }

    fn clear(&mut self) {
        println!("  (cleared {} rows)", self.rows);
        self.rows = 0;
    }

    fn set_loading(&mut self, indicator: Option<&Node>) {
        if let Some(node) = indicator {
            println!("  {}", node.text_content());
        }
    }

    fn set_footer(&mut self, footer: &Footer) -> Option<ElementId> {
        println!("  footer={footer:?}");
        footer.is_sentinel().then(|| {
            self.next_id += 1;
            ElementId(self.next_id)
        })
    }

    fn scroll_metrics(&self) -> ScrollMetrics {
        ScrollMetrics::default()
    }

    fn set_scroll_top(&mut self, _top: u64) {}
}

struct NoObservers;

impl ObserverHost for NoObservers {
    fn observe(&mut self, _target: ElementId, _watch: Watch, _options: WatchOptions) {}
    fn unobserve(&mut self, _target: ElementId, _watch: Watch) {}
    fn disconnect(&mut self, _watch: Watch) {}
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let source = InMemory(vec![
        (1, "info"),
        (2, "error"),
        (3, "warn"),
        (4, "info"),
        (5, "error"),
    ]);
    let options = ListOptions::new(|entry: &LogEntry, _| {
        Node::element("li").text_child(format!("#{} {}", entry.id, entry.level))
    })
    .with_page_size(2);
    let list = ListController::new(options, source, PrintSurface::default(), NoObservers);

    println!("mount: {:?}", list.mount().await);
    while list.state().has_more {
        println!("load_more: {:?}", list.load_more().await);
    }
    println!("loaded={} phase={:?}", list.len(), list.state().phase());

    let outcome = list
        .apply_filters(Filters::new().with("level", "error"))
        .await;
    println!("apply_filters: {outcome:?}");
    println!("filtered={:?}", list.items().iter().map(|e| e.id).collect::<Vec<_>>());
}
