use super::{escape_html, PageContext};

const MATERIALIZE_CSS: &str = "https://cdnjs.cloudflare.com/ajax/libs/materialize/1.0.0/css/materialize.min.css";
const MATERIALIZE_JS: &str = "https://cdnjs.cloudflare.com/ajax/libs/materialize/1.0.0/js/materialize.min.js";

fn nav(ctx: &PageContext) -> String {
    let account = if ctx.is_logged_in {
        format!(
            "<li><a href=\"/profile\">{}</a></li><li><a href=\"/logout\">Log out</a></li>",
            escape_html(ctx.email.as_deref().unwrap_or("Profile"))
        )
    } else {
        "<li><a href=\"/login\">Log in</a></li>".to_string()
    };

    format!(
        "<nav><div class=\"nav-wrapper container\">\
         <a href=\"/\" class=\"brand-logo\">Stuff</a>\
         <ul class=\"right\">\
         <li><a href=\"/stuff\">Inventory</a></li>\
         <li><a href=\"/categories\">Categories</a></li>\
         {}</ul></div></nav>",
        account
    )
}

pub(super) fn page(title: &str, ctx: &PageContext, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n\
         <html lang=\"en\">\n\
         <head>\n\
         <meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{title} | Stuff Inventory</title>\n\
         <link rel=\"stylesheet\" href=\"{css}\">\n\
         <link rel=\"stylesheet\" href=\"/styles.css\">\n\
         </head>\n\
         <body>\n\
         {nav}\n\
         <main class=\"container\">\n\
         {body}\
         </main>\n\
         <script src=\"{js}\"></script>\n\
         </body>\n\
         </html>\n",
        title = escape_html(title),
        css = MATERIALIZE_CSS,
        nav = nav(ctx),
        body = body,
        js = MATERIALIZE_JS,
    )
}
