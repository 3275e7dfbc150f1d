//! Declarative capability registry for external orchestrators.
//!
//! Two named capabilities are exposed: one that turns a topic or query into
//! encyclopedia content, and one that turns content into a saved deck.
//! Which capability handles an inbound instruction is decided by whatever
//! orchestration mechanism consumes this registry; no dispatch logic lives
//! here.

use serde::Serialize;

/// Name of the content-retrieval capability.
pub const RETRIEVAL_CAPABILITY: &str = "wikipedia_content";

/// Name of the deck-generation capability.
pub const ASSEMBLY_CAPABILITY: &str = "presentation_builder";

/// One operation a capability binds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
}

/// A named capability: instruction text plus its bound operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Capability {
    pub name: &'static str,
    pub description: &'static str,
    pub instruction: &'static str,
    pub tools: Vec<ToolSpec>,
}

/// The full registry, in a stable order.
pub fn registry() -> Vec<Capability> {
    vec![
        Capability {
            name: RETRIEVAL_CAPABILITY,
            description: "Searches Wikipedia and returns complete page content.",
            instruction: "You retrieve encyclopedia content. Given a topic or query, \
                          use the bound tools to search Wikipedia and return the \
                          complete content of the matching pages.",
            tools: vec![
                ToolSpec {
                    name: "search",
                    description: "Full-text search returning titles, snippets, and URLs.",
                },
                ToolSpec {
                    name: "get_page",
                    description: "Fetch one page as cleaned plain text with summary, \
                                  categories, and links.",
                },
                ToolSpec {
                    name: "get_summary",
                    description: "Fetch a sentence-limited plain-text summary.",
                },
                ToolSpec {
                    name: "get_random_page",
                    description: "Pick a random main-namespace page title.",
                },
                ToolSpec {
                    name: "get_page_links",
                    description: "List internal links from a page.",
                },
                ToolSpec {
                    name: "get_page_categories",
                    description: "List a page's categories.",
                },
            ],
        },
        Capability {
            name: ASSEMBLY_CAPABILITY,
            description: "Generates a PowerPoint deck from provided content.",
            instruction: "You build presentations. Given titles, bullet points, and \
                          optional images, assemble slides with the bound tools and \
                          save the deck, then confirm the artifact path.",
            tools: vec![
                ToolSpec {
                    name: "add_title_slide",
                    description: "Append a title slide with optional subtitle.",
                },
                ToolSpec {
                    name: "add_content_slide",
                    description: "Append a slide with a title and ordered bullet points.",
                },
                ToolSpec {
                    name: "add_blank_slide",
                    description: "Append an empty slide for free-form content.",
                },
                ToolSpec {
                    name: "add_text_box",
                    description: "Place a text box at an inch-based position.",
                },
                ToolSpec {
                    name: "add_image",
                    description: "Place an image; missing files are skipped, not errors.",
                },
                ToolSpec {
                    name: "format_text",
                    description: "Apply uniform font, size, style, and color to a shape.",
                },
                ToolSpec {
                    name: "set_background",
                    description: "Set a solid background color on a slide.",
                },
                ToolSpec {
                    name: "save",
                    description: "Write the deck to a .pptx artifact, overwriting.",
                },
            ],
        },
    ]
}

/// Look up a capability by name.
pub fn find(name: &str) -> Option<Capability> {
    registry().into_iter().find(|c| c.name == name)
}
