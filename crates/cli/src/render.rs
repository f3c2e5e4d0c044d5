use shelf_app::modules::books::models::{Book, BookDetails};

const MAX_STARS: usize = 10;
const HEADERS: [&str; 5] = ["Title", "Author", "Rating", "Description", "Cover"];

/// One star per whole rating point.
pub fn stars(rating: f64) -> String {
    // `as` saturates: negative and NaN ratings get no stars
    "⭐".repeat((rating.trunc() as usize).min(MAX_STARS))
}

pub fn book_details(details: &BookDetails) -> String {
    let book = &details.book;
    let reviews = if details.reviews.is_empty() {
        "None".to_string()
    } else {
        details.reviews.join(", ")
    };

    format!(
        "Title: {}\nAuthor: {}\nRating: {}\nDescription: {}\nReviews: {}\nCover: {}",
        book.title, book.author, book.rating, book.description, reviews, book.cover_url
    )
}

/// Plain-text table of the catalog, one row per book.
pub fn book_table(books: &[Book]) -> String {
    let rows: Vec<[String; 5]> = books
        .iter()
        .map(|book| {
            [
                book.title.clone(),
                book.author.clone(),
                stars(book.rating),
                book.description.clone(),
                book.cover_url.clone(),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(|header| header.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut lines = vec![
        format_row(&HEADERS.map(String::from), &widths),
        widths
            .iter()
            .map(|width| "-".repeat(*width))
            .collect::<Vec<_>>()
            .join("-+-"),
    ];
    lines.extend(rows.iter().map(|row| format_row(row, &widths)));
    if rows.is_empty() {
        lines.push("(no books)".to_string());
    }

    lines.join("\n")
}

fn format_row(cells: &[String; 5], widths: &[usize; 5]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join(" | ")
        .trim_end()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dune() -> Book {
        Book {
            id: 1,
            title: "Dune".to_string(),
            author: "Herbert".to_string(),
            description: "Desert planet".to_string(),
            rating: 4.5,
            cover_url: "https://covers.s3.amazonaws.com/dune.jpg".to_string(),
        }
    }

    #[test]
    fn stars_truncate_rating() {
        assert_eq!(stars(4.5), "⭐⭐⭐⭐");
        assert_eq!(stars(1.0), "⭐");
        assert_eq!(stars(0.9), "");
        assert_eq!(stars(-2.0), "");
        assert_eq!(stars(f64::NAN), "");
        assert_eq!(stars(1e12).chars().count(), MAX_STARS);
    }

    #[test]
    fn details_list_reviews_or_none() {
        let mut details = BookDetails {
            book: dune(),
            reviews: vec![],
        };
        assert_eq!(
            book_details(&details),
            "Title: Dune\nAuthor: Herbert\nRating: 4.5\nDescription: Desert planet\n\
             Reviews: None\nCover: https://covers.s3.amazonaws.com/dune.jpg"
        );

        details.reviews = vec!["Great".to_string(), "Long".to_string()];
        assert!(book_details(&details).contains("Reviews: Great, Long"));
    }

    #[test]
    fn table_has_header_and_rows() {
        let table = book_table(&[dune()]);
        let lines: Vec<_> = table.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Title | Author  | Rating"));
        assert!(lines[2].starts_with("Dune  | Herbert | ⭐⭐⭐⭐"));
        assert!(lines[2].ends_with("dune.jpg"));
    }

    #[test]
    fn empty_table_says_so() {
        assert!(book_table(&[]).ends_with("(no books)"));
    }
}
