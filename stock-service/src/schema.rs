diesel::table! {
    products (id) {
        id -> Uuid,
        name -> Varchar,
        description -> Text,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    stock_records (product_id) {
        product_id -> Uuid,
        quantity -> Int4,
        version -> Int4,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(stock_records -> products (product_id));

diesel::allow_tables_to_appear_in_same_query!(
    products,
    stock_records,
);
