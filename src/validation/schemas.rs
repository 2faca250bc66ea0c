use super::{Field, Rule, ValidationSchema};

pub const ROLES: &[&str] = &["user", "editor", "admin"];

pub const BLOG_CATEGORIES: &[&str] = &["Adventure", "Culture", "Food", "Nature", "Travel Tips"];

pub const CONTINENTS: &[&str] = &[
    "Africa",
    "Antarctica",
    "Asia",
    "Europe",
    "North America",
    "Oceania",
    "South America",
];

const NAME: Rule = Rule::Text {
    non_empty: true,
    max_len: Some(120),
};

pub static AUTH_TOKENS: ValidationSchema = ValidationSchema {
    name: "auth tokens",
    fields: &[
        Field::required("userId", Rule::NON_EMPTY),
        Field::required("email", Rule::Email),
        Field::optional("role", Rule::OneOf(ROLES)),
    ],
};

pub static REFRESH_TOKENS: ValidationSchema = ValidationSchema {
    name: "refresh tokens",
    fields: &[Field::required("refreshToken", Rule::NON_EMPTY)],
};

pub static FEEDBACK: ValidationSchema = ValidationSchema {
    name: "feedback",
    fields: &[
        Field::required("firstName", NAME),
        Field::required("lastName", NAME),
        Field::required("email", Rule::Email),
        Field::required(
            "age",
            Rule::Integer {
                min: Some(1),
                max: Some(120),
            },
        ),
        Field::required("country", NAME),
        Field::required(
            "message",
            Rule::Text {
                non_empty: true,
                max_len: Some(2000),
            },
        ),
    ],
};

pub static SUBSCRIPTION: ValidationSchema = ValidationSchema {
    name: "subscription",
    fields: &[Field::required("email", Rule::Email)],
};

pub static BLOG: ValidationSchema = ValidationSchema {
    name: "blog",
    fields: &[
        Field::required(
            "title",
            Rule::Text {
                non_empty: true,
                max_len: Some(200),
            },
        ),
        Field::required("author", NAME),
        Field::required("category", Rule::OneOf(BLOG_CATEGORIES)),
        Field::optional(
            "summary",
            Rule::Text {
                non_empty: true,
                max_len: Some(500),
            },
        ),
        Field::required("content", Rule::NON_EMPTY),
        Field::optional("image", Rule::Url),
        Field::optional("tags", Rule::TextList),
        Field::optional(
            "readTime",
            Rule::Integer {
                min: Some(1),
                max: Some(u32::MAX as i64),
            },
        ),
    ],
};

pub static COUNTRY: ValidationSchema = ValidationSchema {
    name: "country",
    fields: &[
        Field::required("name", NAME),
        Field::required("continent", Rule::OneOf(CONTINENTS)),
        Field::optional("capital", NAME),
        Field::optional("description", Rule::NON_EMPTY),
        Field::optional("image", Rule::Url),
    ],
};

pub static DESTINATION: ValidationSchema = ValidationSchema {
    name: "destination",
    fields: &[
        Field::required("name", NAME),
        Field::required("country", NAME),
        Field::required("description", Rule::NON_EMPTY),
        Field::optional("image", Rule::Url),
        Field::optional(
            "rating",
            Rule::Number {
                min: Some(0.0),
                max: Some(5.0),
            },
        ),
        Field::optional("bestTimeToVisit", NAME),
        Field::optional("highlights", Rule::TextList),
    ],
};
