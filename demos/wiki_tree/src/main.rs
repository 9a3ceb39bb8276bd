//! Print the node tree of a wiki space.
//!
//! ```text
//! LARK_APP_ID=cli_xxx LARK_APP_SECRET=xxx cargo run -p wiki_tree -- <space_id>
//! ```
//!
//! Without a space id, the spaces visible to the app are listed instead.

use futures::TryStreamExt;
use lark_openapi::api::wiki::{ListNodesQuery, Node, Wiki};
use lark_openapi::{collect_items, Client, LarkConfig, LarkError, PageQuery};

async fn children(
    wiki: &Wiki<'_>,
    space_id: &str,
    parent: Option<String>,
) -> Result<Vec<Node>, LarkError> {
    let query = ListNodesQuery {
        page: PageQuery::new().with_page_size(50),
        parent_node_token: parent,
    };
    let mut nodes = Vec::new();
    let mut pages = wiki.list_nodes_iter(space_id, &query);
    while let Some(page) = pages.try_next().await? {
        nodes.extend(page.items);
    }
    Ok(nodes)
}

#[tokio::main]
async fn main() -> Result<(), LarkError> {
    tracing_subscriber::fmt::init();

    let client = Client::new(LarkConfig::from_env()?);
    let wiki = client.wiki();

    let Some(space_id) = std::env::args().nth(1) else {
        let spaces = collect_items(wiki.list_spaces_iter(&PageQuery::new(), None)).await?;
        for space in spaces {
            println!(
                "{}\t{}",
                space.space_id.unwrap_or_default(),
                space.name.unwrap_or_default()
            );
        }
        return Ok(());
    };

    // Depth-first; siblings are pushed reversed so they pop in API order.
    let mut stack: Vec<(Node, usize)> = children(&wiki, &space_id, None)
        .await?
        .into_iter()
        .rev()
        .map(|node| (node, 0))
        .collect();
    let mut total = 0usize;
    while let Some((node, depth)) = stack.pop() {
        println!(
            "{}{} [{}]",
            "  ".repeat(depth),
            node.title.as_deref().unwrap_or("(untitled)"),
            node.obj_type.as_deref().unwrap_or("?")
        );
        total += 1;
        if node.has_child.unwrap_or(false) {
            let kids = children(&wiki, &space_id, node.node_token.clone()).await?;
            stack.extend(kids.into_iter().rev().map(|kid| (kid, depth + 1)));
        }
    }
    tracing::info!(space_id = %space_id, total, "walked wiki space");
    Ok(())
}
