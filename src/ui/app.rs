//! Application state and TUI event loop
//!
//! Manages the application state and handles user input for the
//! dependency forest explorer.

use std::io;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame, Terminal,
};

use super::tree::{flatten_forest, toggle_forest_at_index, FlattenedNode, TreeNode};

/// Virtual scroll state for efficient rendering of large trees
#[derive(Debug, Default, Clone)]
pub struct VirtualScrollState {
    /// First visible row index
    pub offset: usize,
    /// Number of visible rows in the viewport
    pub viewport_height: usize,
}

impl VirtualScrollState {
    /// Create a new virtual scroll state
    pub fn new() -> Self {
        Self::default()
    }

    /// Update the viewport height
    pub fn set_viewport_height(&mut self, height: usize) {
        self.viewport_height = height;
    }

    /// Calculate the visible range for the current offset
    pub fn visible_range(&self, total: usize) -> (usize, usize) {
        if total == 0 || self.viewport_height == 0 {
            return (0, 0);
        }
        let start = self.offset.min(total - 1);
        (start, (start + self.viewport_height).min(total))
    }

    /// Update offset to ensure selection is visible
    pub fn ensure_visible(&mut self, selected: usize, total: usize) {
        if total == 0 || self.viewport_height == 0 {
            return;
        }

        if selected < self.offset {
            self.offset = selected;
        } else if selected >= self.offset + self.viewport_height {
            self.offset = selected.saturating_sub(self.viewport_height - 1);
        }
    }
}

/// Application state
pub struct App {
    /// One node per root of the forest
    pub roots: Vec<TreeNode>,
    /// Currently selected index in the displayed list
    pub selected_index: usize,
    /// Flattened representation for rendering
    pub flattened: Vec<FlattenedNode>,
    /// Filtered flattened view (when search is active)
    pub filtered: Vec<FlattenedNode>,
    /// Whether the application should quit
    pub should_quit: bool,
    /// List state for ratatui
    list_state: ListState,
    /// Whether search mode is active
    pub search_active: bool,
    /// Current search query
    pub search_query: String,
    /// Virtual scroll state for performance with large trees
    pub scroll_state: VirtualScrollState,
}

impl App {
    /// Create a new application over the given root nodes
    pub fn new(roots: Vec<TreeNode>) -> Self {
        let mut app = Self {
            roots,
            selected_index: 0,
            flattened: Vec::new(),
            filtered: Vec::new(),
            should_quit: false,
            list_state: ListState::default(),
            search_active: false,
            search_query: String::new(),
            scroll_state: VirtualScrollState::new(),
        };
        app.refresh_flattened();
        app.list_state.select(Some(0));
        app
    }

    /// Refresh the flattened view from the tree
    pub fn refresh_flattened(&mut self) {
        self.flattened = flatten_forest(&self.roots);

        if !self.flattened.is_empty() && self.selected_index >= self.flattened.len() {
            self.selected_index = self.flattened.len() - 1;
        }
    }

    /// Move selection to the next item
    pub fn select_next(&mut self) {
        let total = self.current_list_len();
        if total > 0 {
            self.selected_index = (self.selected_index + 1).min(total - 1);
            self.sync_selection(total);
        }
    }

    /// Move selection to the previous item
    pub fn select_previous(&mut self) {
        let total = self.current_list_len();
        if total > 0 && self.selected_index > 0 {
            self.selected_index -= 1;
            self.sync_selection(total);
        }
    }

    /// Move selection down by a page
    pub fn page_down(&mut self) {
        let total = self.current_list_len();
        if total > 0 {
            let page_size = self.scroll_state.viewport_height.max(1);
            self.selected_index = (self.selected_index + page_size).min(total - 1);
            self.sync_selection(total);
        }
    }

    /// Move selection up by a page
    pub fn page_up(&mut self) {
        let total = self.current_list_len();
        if total > 0 {
            let page_size = self.scroll_state.viewport_height.max(1);
            self.selected_index = self.selected_index.saturating_sub(page_size);
            self.sync_selection(total);
        }
    }

    /// Jump to the first item
    pub fn select_first(&mut self) {
        if self.current_list_len() > 0 {
            self.selected_index = 0;
            self.list_state.select(Some(0));
            self.scroll_state.offset = 0;
        }
    }

    /// Jump to the last item
    pub fn select_last(&mut self) {
        let total = self.current_list_len();
        if total > 0 {
            self.selected_index = total - 1;
            self.sync_selection(total);
        }
    }

    fn sync_selection(&mut self, total: usize) {
        self.list_state.select(Some(self.selected_index));
        self.scroll_state.ensure_visible(self.selected_index, total);
    }

    /// Get the current list length (filtered or full)
    fn current_list_len(&self) -> usize {
        if self.search_query.is_empty() {
            self.flattened.len()
        } else {
            self.filtered.len()
        }
    }

    /// Toggle expansion of the selected item
    ///
    /// Ignored while a filter is applied, since filtered rows do not map
    /// back to tree positions.
    pub fn toggle_selected(&mut self) {
        if !self.search_query.is_empty() {
            return;
        }
        if toggle_forest_at_index(&mut self.roots, self.selected_index) {
            self.refresh_flattened();
        }
    }

    /// Signal that the application should quit
    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Get the tree prefix for a node at the given index
    fn get_tree_prefix(&self, index: usize) -> String {
        let Some(node) = self.flattened.get(index) else {
            return String::new();
        };

        // is_last_child of the nearest ancestor at each depth below the roots
        let mut ancestors_last = vec![false; node.depth.saturating_sub(1)];
        let mut wanted = node.depth;
        for n in self.flattened[..index].iter().rev() {
            if wanted <= 1 {
                break;
            }
            if n.depth < wanted {
                wanted = n.depth;
                if wanted > 0 {
                    ancestors_last[wanted - 1] = n.is_last_child;
                }
            }
        }

        let mut prefix = String::new();
        for &is_last in ancestors_last.iter() {
            prefix.push_str(if is_last { "    " } else { "│   " });
        }

        if node.depth > 0 {
            prefix.push_str(if node.is_last_child { "└── " } else { "├── " });
        }

        prefix
    }

    /// Start search mode
    pub fn start_search(&mut self) {
        self.search_active = true;
        self.search_query.clear();
    }

    /// Clear search and return to normal mode
    pub fn clear_search(&mut self) {
        self.search_active = false;
        self.search_query.clear();
        self.filtered.clear();
        self.selected_index = 0;
        self.list_state.select(Some(0));
    }

    /// Add a character to the search query
    pub fn search_push(&mut self, c: char) {
        self.search_query.push(c);
        self.update_filter();
    }

    /// Remove the last character from the search query
    pub fn search_pop(&mut self) {
        self.search_query.pop();
        self.update_filter();
    }

    /// Update the filtered view based on the current search query
    fn update_filter(&mut self) {
        if self.search_query.is_empty() {
            self.filtered.clear();
        } else {
            self.filtered = self
                .flattened
                .iter()
                .filter(|node| fuzzy_match(&node.name, &self.search_query))
                .cloned()
                .collect();
        }
        self.selected_index = 0;
        self.list_state.select(Some(0));
    }
}

/// Perform fuzzy matching of query against text (case-insensitive)
/// A match requires all characters of the query to appear in order in the text
fn fuzzy_match(text: &str, query: &str) -> bool {
    let text_lower = text.to_lowercase();
    let query_lower = query.to_lowercase();

    let mut query_chars = query_lower.chars().peekable();
    for c in text_lower.chars() {
        if query_chars.peek() == Some(&c) {
            query_chars.next();
        }
    }
    query_chars.peek().is_none()
}

/// Get the base color for a node
///
/// - Cycle stubs: Red
/// - Roots: White
/// - Everything else: Green
fn get_node_color(node: &FlattenedNode) -> Color {
    if node.truncated {
        Color::Red
    } else if node.depth == 0 {
        Color::White
    } else {
        Color::Green
    }
}

/// Maximum depth for color gradient calculations
const MAX_DEPTH_FOR_COLOR: usize = 10;

/// Get color intensity based on depth (brighter = closer to root)
///
/// Returns a brightness factor from 1.0 at the root down to 0.4.
fn get_depth_brightness(depth: usize) -> f32 {
    let clamped_depth = depth.min(MAX_DEPTH_FOR_COLOR);
    let ratio = clamped_depth as f32 / MAX_DEPTH_FOR_COLOR as f32;
    1.0 - (ratio * 0.6)
}

/// Apply brightness modifier to a color based on depth
fn apply_depth_color(base_color: Color, depth: usize) -> Color {
    let brightness = get_depth_brightness(depth);
    let scale = |v: u8| (v as f32 * brightness) as u8;

    match base_color {
        Color::Rgb(r, g, b) => Color::Rgb(scale(r), scale(g), scale(b)),
        Color::Green => Color::Rgb(0, scale(255), 0),
        Color::Red => Color::Rgb(scale(255), 0, 0),
        Color::White => Color::Rgb(scale(255), scale(255), scale(255)),
        other => other,
    }
}

/// Get the depth indicator string for a node
fn get_depth_indicator(depth: usize) -> String {
    if depth == 0 {
        String::new()
    } else {
        format!("L{} ", depth)
    }
}

/// Get the cycle indicator for truncated nodes
fn get_cycle_indicator(truncated: bool) -> &'static str {
    if truncated {
        "[↺] "
    } else {
        ""
    }
}

/// Run the TUI application
pub fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        terminal.draw(|frame| render(frame, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                if app.search_active {
                    match key.code {
                        KeyCode::Esc => app.clear_search(),
                        // Keep the filter but leave input mode
                        KeyCode::Enter => app.search_active = false,
                        KeyCode::Backspace => app.search_pop(),
                        KeyCode::Char(c) => app.search_push(c),
                        KeyCode::Down | KeyCode::Tab => app.select_next(),
                        KeyCode::Up | KeyCode::BackTab => app.select_previous(),
                        _ => {}
                    }
                } else {
                    match key.code {
                        KeyCode::Char('q') => app.quit(),
                        KeyCode::Esc => {
                            if app.search_query.is_empty() {
                                app.quit();
                            } else {
                                app.clear_search();
                            }
                        }
                        KeyCode::Char('/') => app.start_search(),
                        KeyCode::Char('j') | KeyCode::Down => app.select_next(),
                        KeyCode::Char('k') | KeyCode::Up => app.select_previous(),
                        KeyCode::Enter | KeyCode::Char(' ') => app.toggle_selected(),
                        KeyCode::PageDown | KeyCode::Char('d') => app.page_down(),
                        KeyCode::PageUp | KeyCode::Char('u') => app.page_up(),
                        KeyCode::Home | KeyCode::Char('g') => app.select_first(),
                        KeyCode::End | KeyCode::Char('G') => app.select_last(),
                        _ => {}
                    }
                }
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

/// Render the application UI
fn render(frame: &mut Frame, app: &mut App) {
    let show_search = app.search_active || !app.search_query.is_empty();

    let mut constraints = vec![Constraint::Length(3)];
    if show_search {
        constraints.push(Constraint::Length(3));
    }
    constraints.push(Constraint::Min(0));
    constraints.push(Constraint::Length(3));

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(frame.area());

    render_header(frame, chunks[0]);
    let tree_area = if show_search {
        render_search_bar(frame, app, chunks[1]);
        chunks[2]
    } else {
        chunks[1]
    };
    render_tree(frame, app, tree_area);
    render_footer(frame, app, chunks[chunks.len() - 1]);
}

/// Render the header
fn render_header(frame: &mut Frame, area: Rect) {
    let header = Paragraph::new("dtree - Module Dependency Forest")
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(header, area);
}

/// Render the search bar
fn render_search_bar(frame: &mut Frame, app: &App, area: Rect) {
    let (border_color, title) = if app.search_active {
        (Color::Yellow, "Search (Enter to confirm, Esc to cancel)")
    } else {
        (Color::Gray, "Filter (/ to edit, Esc to clear)")
    };

    let cursor = if app.search_active { "_" } else { "" };
    let result_count = if app.search_query.is_empty() {
        String::new()
    } else {
        format!(" ({} matches)", app.filtered.len())
    };

    let content = Line::from(vec![
        Span::styled(format!("/{}", app.search_query), Style::default().fg(Color::White)),
        Span::styled(cursor, Style::default().fg(Color::Yellow).add_modifier(Modifier::SLOW_BLINK)),
        Span::styled(result_count, Style::default().fg(Color::DarkGray)),
    ]);

    let search_bar = Paragraph::new(content).block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border_color)),
    );
    frame.render_widget(search_bar, area);
}

/// Render the forest with virtual scrolling
///
/// Only renders visible rows; updates the viewport height from the area.
pub fn render_tree(frame: &mut Frame, app: &mut App, area: Rect) {
    let has_search = !app.search_query.is_empty();
    let total_nodes = app.current_list_len();

    // Border takes 2 rows (top + bottom)
    let viewport_height = (area.height as usize).saturating_sub(2);
    app.scroll_state.set_viewport_height(viewport_height);
    app.scroll_state.ensure_visible(app.selected_index, total_nodes);
    let (start_idx, end_idx) = app.scroll_state.visible_range(total_nodes);

    let display_nodes: &[FlattenedNode] = if has_search {
        &app.filtered
    } else {
        &app.flattened
    };
    let items: Vec<ListItem> = display_nodes[start_idx..end_idx]
        .iter()
        .enumerate()
        .map(|(visible_idx, node)| {
            // Tree lines only make sense in the unfiltered view
            let prefix = if has_search {
                String::new()
            } else {
                app.get_tree_prefix(start_idx + visible_idx)
            };
            let color = apply_depth_color(get_node_color(node), node.depth);
            let depth_color = apply_depth_color(Color::Rgb(100, 149, 237), node.depth);

            let mut spans = vec![
                Span::styled(prefix, Style::default().fg(Color::DarkGray)),
                Span::styled(node.expansion_indicator(), Style::default().fg(Color::Yellow)),
                Span::styled(get_depth_indicator(node.depth), Style::default().fg(depth_color)),
                Span::styled(get_cycle_indicator(node.truncated), Style::default().fg(Color::Red)),
            ];
            if has_search {
                spans.extend(highlight_matches(&node.name, &app.search_query, color));
            } else {
                spans.push(Span::styled(node.name.clone(), Style::default().fg(color)));
            }
            if !node.version.is_empty() {
                spans.push(Span::styled(
                    format!(" @{}", node.version),
                    Style::default().fg(Color::DarkGray),
                ));
            }

            ListItem::new(Line::from(spans))
        })
        .collect();

    let relative_selection = app.selected_index.saturating_sub(start_idx);
    app.list_state.select(Some(relative_selection));

    let title = if has_search {
        format!("Modules (filtered: {} matches)", total_nodes)
    } else if total_nodes > viewport_height {
        format!("Modules ({}-{} of {})", start_idx + 1, end_idx, total_nodes)
    } else {
        format!("Modules ({})", total_nodes)
    };

    let tree_list = List::new(items)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Gray)),
        )
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("► ");

    frame.render_stateful_widget(tree_list, area, &mut app.list_state);
}

/// Highlight matching characters in a string based on fuzzy search
fn highlight_matches(text: &str, query: &str, base_color: Color) -> Vec<Span<'static>> {
    let match_style = Style::default()
        .fg(Color::Magenta)
        .add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
    let base_style = Style::default().fg(base_color);

    let query_lower = query.to_lowercase();
    let mut query_chars = query_lower.chars().peekable();
    let mut result = Vec::new();
    let mut segment = String::new();
    let mut segment_is_match = false;

    for c in text.chars() {
        let c_lower = c.to_lowercase().next().unwrap_or(c);
        let is_match = query_chars.peek() == Some(&c_lower);
        if is_match {
            query_chars.next();
        }

        if is_match != segment_is_match && !segment.is_empty() {
            let style = if segment_is_match { match_style } else { base_style };
            result.push(Span::styled(std::mem::take(&mut segment), style));
        }
        segment.push(c);
        segment_is_match = is_match;
    }

    if !segment.is_empty() {
        let style = if segment_is_match { match_style } else { base_style };
        result.push(Span::styled(segment, style));
    }

    result
}

/// Render the footer with help text and legend
fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let key = |k: &'static str| Span::styled(k, Style::default().fg(Color::Yellow));
    let help_text = if app.search_active {
        Line::from(vec![
            key("Type"),
            Span::raw(" to search  "),
            key("↑/↓"),
            Span::raw(" Navigate  "),
            key("Enter"),
            Span::raw(" Confirm  "),
            key("Esc"),
            Span::raw(" Cancel"),
        ])
    } else {
        Line::from(vec![
            key("/"),
            Span::raw(" Search  "),
            key("j/k"),
            Span::raw(" Nav  "),
            key("d/u"),
            Span::raw(" Page  "),
            key("g/G"),
            Span::raw(" Top/Bot  "),
            key("Enter"),
            Span::raw(" Toggle  "),
            key("q"),
            Span::raw(" Quit  │  "),
            Span::styled("[↺]", Style::default().fg(Color::Red)),
            Span::raw(" Cycle  "),
            Span::styled("L#", Style::default().fg(Color::Rgb(100, 149, 237))),
            Span::raw(" Depth"),
        ])
    };

    let footer = Paragraph::new(help_text)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(footer, area);
}
