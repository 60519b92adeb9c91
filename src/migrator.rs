use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_catalog_tables::Migration),
            Box::new(m20240101_000002_create_orders_table::Migration),
            Box::new(m20240101_000003_create_order_items_table::Migration),
        ]
    }
}

mod m20240101_000001_create_catalog_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000001_create_catalog_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Products::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Products::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Products::Name).string().not_null())
                        .col(ColumnDef::new(Products::Description).text().null())
                        .col(ColumnDef::new(Products::Price).decimal_len(16, 2).not_null())
                        .col(ColumnDef::new(Products::PictureUrl).string().null())
                        .col(ColumnDef::new(Products::Brand).string().null())
                        .col(ColumnDef::new(Products::ProductType).string().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(DeliveryMethods::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(DeliveryMethods::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(DeliveryMethods::ShortName).string().not_null())
                        .col(ColumnDef::new(DeliveryMethods::DeliveryTime).string().not_null())
                        .col(ColumnDef::new(DeliveryMethods::Description).string().not_null())
                        .col(
                            ColumnDef::new(DeliveryMethods::Price)
                                .decimal_len(16, 2)
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(DeliveryMethods::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Products::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Products {
        Table,
        Id,
        Name,
        Description,
        Price,
        PictureUrl,
        Brand,
        ProductType,
    }

    #[derive(DeriveIden)]
    enum DeliveryMethods {
        Table,
        Id,
        ShortName,
        DeliveryTime,
        Description,
        Price,
    }
}

mod m20240101_000002_create_orders_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000002_create_orders_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Orders::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Orders::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Orders::BuyerEmail).string().not_null())
                        .col(
                            ColumnDef::new(Orders::OrderDate)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Orders::ShipName).string().not_null())
                        .col(ColumnDef::new(Orders::ShipLine1).string().not_null())
                        .col(ColumnDef::new(Orders::ShipLine2).string().null())
                        .col(ColumnDef::new(Orders::ShipCity).string().not_null())
                        .col(ColumnDef::new(Orders::ShipState).string().not_null())
                        .col(ColumnDef::new(Orders::ShipPostalCode).string().not_null())
                        .col(ColumnDef::new(Orders::ShipCountry).string().not_null())
                        .col(ColumnDef::new(Orders::DeliveryMethodId).integer().not_null())
                        .col(ColumnDef::new(Orders::DeliveryShortName).string().not_null())
                        .col(ColumnDef::new(Orders::DeliveryTime).string().not_null())
                        .col(
                            ColumnDef::new(Orders::DeliveryPrice)
                                .decimal_len(16, 2)
                                .not_null(),
                        )
                        .col(ColumnDef::new(Orders::CardBrand).string().not_null())
                        .col(ColumnDef::new(Orders::CardLast4).string().not_null())
                        .col(ColumnDef::new(Orders::CardExpMonth).integer().not_null())
                        .col(ColumnDef::new(Orders::CardExpYear).integer().not_null())
                        .col(ColumnDef::new(Orders::Subtotal).decimal_len(16, 2).not_null())
                        .col(
                            ColumnDef::new(Orders::Status)
                                .string()
                                .not_null()
                                .default("Pending"),
                        )
                        .col(ColumnDef::new(Orders::PaymentIntentId).string().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_orders_payment_intent_id")
                        .table(Orders::Table)
                        .col(Orders::PaymentIntentId)
                        .unique()
                        .if_not_exists()
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_orders_buyer_email")
                        .table(Orders::Table)
                        .col(Orders::BuyerEmail)
                        .if_not_exists()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Orders::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Orders {
        Table,
        Id,
        BuyerEmail,
        OrderDate,
        ShipName,
        ShipLine1,
        ShipLine2,
        ShipCity,
        ShipState,
        ShipPostalCode,
        ShipCountry,
        DeliveryMethodId,
        DeliveryShortName,
        DeliveryTime,
        DeliveryPrice,
        CardBrand,
        CardLast4,
        CardExpMonth,
        CardExpYear,
        Subtotal,
        Status,
        PaymentIntentId,
    }
}

mod m20240101_000003_create_order_items_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000003_create_order_items_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(OrderItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(OrderItems::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(OrderItems::OrderId).uuid().not_null())
                        .col(ColumnDef::new(OrderItems::ProductId).integer().not_null())
                        .col(ColumnDef::new(OrderItems::ProductName).string().not_null())
                        .col(ColumnDef::new(OrderItems::PictureUrl).string().null())
                        .col(
                            ColumnDef::new(OrderItems::UnitPrice)
                                .decimal_len(16, 2)
                                .not_null(),
                        )
                        .col(ColumnDef::new(OrderItems::Quantity).integer().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_order_items_order_id")
                                .from(OrderItems::Table, OrderItems::OrderId)
                                .to(Orders::Table, Orders::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_order_items_order_id")
                        .table(OrderItems::Table)
                        .col(OrderItems::OrderId)
                        .if_not_exists()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(OrderItems::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum OrderItems {
        Table,
        Id,
        OrderId,
        ProductId,
        ProductName,
        PictureUrl,
        UnitPrice,
        Quantity,
    }

    #[derive(DeriveIden)]
    enum Orders {
        Table,
        Id,
    }
}
