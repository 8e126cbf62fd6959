diesel::table! {
    eachordereditem (item_id) {
        item_id -> Int4,
        order_id -> Int4,
        menu_id -> Int4,
        quantity -> Int4,
    }
}

diesel::table! {
    employees (employee_id) {
        employee_id -> Int4,
        name -> Varchar,
    }
}

diesel::table! {
    idtracker (id) {
        id -> Int4,
        local_each_ordered_id -> Int4,
    }
}

diesel::table! {
    ingredients (ingredient_id) {
        ingredient_id -> Int4,
        ingredient -> Varchar,
        current_count -> Numeric,
        critical_count -> Numeric,
        restock_count -> Int4,
    }
}

diesel::table! {
    menucategories (menu_id) {
        menu_id -> Int4,
        category -> Varchar,
    }
}

diesel::table! {
    menuitems (menu_id) {
        menu_id -> Int4,
        item_name -> Varchar,
        price -> Numeric,
    }
}

diesel::table! {
    menutoingredient (menu_id, ingredient_id) {
        menu_id -> Int4,
        ingredient_id -> Int4,
    }
}

diesel::table! {
    orderidtracker (last_order_id) {
        last_order_id -> Int4,
    }
}

diesel::table! {
    orders (order_id) {
        order_id -> Int4,
        employee_id -> Int4,
        order_date -> Timestamp,
        total -> Numeric,
        tips -> Numeric,
    }
}

diesel::table! {
    zreports (id) {
        id -> Int4,
        date -> Date,
        ran -> Bool,
        closed_at -> Timestamp,
    }
}

diesel::joinable!(eachordereditem -> menuitems (menu_id));
diesel::joinable!(eachordereditem -> orders (order_id));
diesel::joinable!(menucategories -> menuitems (menu_id));
diesel::joinable!(menutoingredient -> ingredients (ingredient_id));
diesel::joinable!(menutoingredient -> menuitems (menu_id));
diesel::joinable!(orders -> employees (employee_id));

diesel::allow_tables_to_appear_in_same_query!(
    eachordereditem,
    employees,
    idtracker,
    ingredients,
    menucategories,
    menuitems,
    menutoingredient,
    orderidtracker,
    orders,
    zreports,
);
