//! Server-side HTML pages.
//!
//! Every page is a pure function of its data and the request's [`PageContext`].
//! Anything that came from a user or the identity provider goes through
//! [`escape_html`] before it is interpolated.

use axum::http::StatusCode;
use axum::response::Html;
use std::fmt::Write;

use crate::database::models::{Category, Item, ItemSummary};

mod layout;

/// Per-request values every page can show, published by the session middleware
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageContext {
    pub is_logged_in: bool,
    pub email: Option<String>,
    pub user_name: Option<String>,
}

pub enum View<'a> {
    Home,
    Stuff(&'a [ItemSummary]),
    Categories(&'a [Category]),
    Item(&'a Item),
}

pub fn render(view: &View<'_>, ctx: &PageContext) -> Html<String> {
    let (title, body) = match view {
        View::Home => ("Home", home(ctx)),
        View::Stuff(items) => ("Inventory", stuff(items)),
        View::Categories(categories) => ("Categories", categories_page(categories, ctx)),
        View::Item(item) => ("Item", item_detail(item)),
    };
    Html(layout::page(title, ctx, &body))
}

pub fn error_page(status: StatusCode, message: &str) -> Html<String> {
    let title = status.canonical_reason().unwrap_or("Error");
    let body = format!(
        "<h3>{} {}</h3>\n<p>{}</p>\n<p><a href=\"/\">Back to home</a></p>",
        status.as_u16(),
        escape_html(title),
        escape_html(message)
    );
    Html(layout::page(title, &PageContext::default(), &body))
}

pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Percent-encode a value used as a single path segment
fn path_segment(raw: &str) -> String {
    url::form_urlencoded::byte_serialize(raw.as_bytes()).collect()
}

fn home(ctx: &PageContext) -> String {
    let mut body = String::from("<h3>Stuff Inventory</h3>\n<p>Keep track of the things you own.</p>\n");
    if ctx.is_logged_in {
        let who = ctx.user_name.as_deref().or(ctx.email.as_deref()).unwrap_or("you");
        let _ = write!(
            body,
            "<p>Welcome back, {}.</p>\n<a class=\"btn\" href=\"/stuff\">View your stuff</a>\n",
            escape_html(who)
        );
    } else {
        body.push_str("<a class=\"btn\" href=\"/login\">Log in to get started</a>\n");
    }
    body
}

fn stuff(items: &[ItemSummary]) -> String {
    let mut body = String::from("<h3>Your stuff</h3>\n");

    if items.is_empty() {
        body.push_str("<p class=\"inventory-empty\">Nothing here yet.</p>\n");
    } else {
        body.push_str(
            "<table class=\"striped\">\n<thead><tr><th>Item</th><th>Quantity</th><th>Category</th><th></th></tr></thead>\n<tbody>\n",
        );
        for item in items {
            let _ = write!(
                body,
                "<tr><td><a href=\"/stuff/item/{id}\">{name}</a></td><td>{quantity}</td><td>{category}</td>\
                 <td><a href=\"/stuff/item/{id}\">Info/Edit</a> <a href=\"/stuff/item/{id}/delete\">Delete</a></td></tr>\n",
                id = item.id,
                name = escape_html(&item.item),
                quantity = item.quantity,
                category = escape_html(item.category.as_deref().unwrap_or("")),
            );
        }
        body.push_str("</tbody>\n</table>\n");
    }

    body.push_str(
        "<h5>Add an item</h5>\n\
         <form method=\"post\" action=\"/stuff\">\n\
         <label for=\"name\">Name</label><input type=\"text\" id=\"name\" name=\"name\" required>\n\
         <label for=\"quantity\">Quantity</label><input type=\"number\" id=\"quantity\" name=\"quantity\" required>\n\
         <button class=\"btn\" type=\"submit\">Add</button>\n\
         </form>\n",
    );
    body
}

fn categories_page(categories: &[Category], ctx: &PageContext) -> String {
    let mut body = String::from("<h3>Your categories</h3>\n");

    if categories.is_empty() {
        body.push_str("<p class=\"inventory-empty\">No categories yet.</p>\n");
    } else {
        body.push_str("<ul class=\"collection\">\n");
        for category in categories {
            let _ = write!(
                body,
                "<li class=\"collection-item\">{} <a href=\"/categories/{}/delete\">Delete</a></li>\n",
                escape_html(&category.category_name),
                category.category_id
            );
        }
        body.push_str("</ul>\n");
    }

    if let Some(email) = ctx.email.as_deref() {
        let _ = write!(
            body,
            "<h5>Add a category</h5>\n\
             <form method=\"post\" action=\"/categories/{}\">\n\
             <label for=\"category_name\">Name</label><input type=\"text\" id=\"category_name\" name=\"category_name\" required>\n\
             <button class=\"btn\" type=\"submit\">Add</button>\n\
             </form>\n",
            escape_html(&path_segment(email))
        );
    }
    body
}

fn item_detail(item: &Item) -> String {
    let description = item.description.as_deref().unwrap_or("");
    format!(
        "<h3>{name}</h3>\n\
         <p>Quantity: <span class=\"quantity\">{quantity}</span></p>\n\
         <p>Description: <span class=\"description\">{description}</span></p>\n\
         <h5>Edit</h5>\n\
         <form method=\"post\" action=\"/stuff/item/{id}\">\n\
         <label for=\"name\">Name</label><input type=\"text\" id=\"name\" name=\"name\" value=\"{name}\" required>\n\
         <label for=\"quantity\">Quantity</label><input type=\"number\" id=\"quantity\" name=\"quantity\" value=\"{quantity}\" required>\n\
         <label for=\"description\">Description</label><textarea id=\"description\" name=\"description\">{description}</textarea>\n\
         <button class=\"btn\" type=\"submit\">Save</button>\n\
         </form>\n\
         <p><a href=\"/stuff/item/{id}/delete\">Delete</a> | <a href=\"/stuff\">Back to inventory</a></p>\n",
        id = item.id,
        name = escape_html(&item.item),
        quantity = item.quantity,
        description = escape_html(description),
    )
}
