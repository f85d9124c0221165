// src/db/obra_repo.rs

use sqlx::{Executor, PgPool, Postgres};

use crate::{
    common::error::AppError,
    models::obra::{
        EstadoObra, EstadoPago, LugaresRecibidos, Obra, ObraCalle, ObraDatosPayload, SiNo,
        VerificacionPayload,
    },
};

// Columnas de obras en el orden de la struct. Las usamos en cada RETURNING
// para que query_as siempre reciba la fila completa.
const OBRA_COLS: &str = "id, consecutivo, tramite_id, propietario, tipo_propietario, \
    representante_legal, identificacion, domicilio_propietario, telefono, \
    colonia_id, manzana, lote, etapa, condominio, \
    destino_actual, destino_propuesto, descripcion_proyecto, \
    agua_potable, drenaje, energia_electrica, \
    servidumbre_frente, servidumbre_lateral, servidumbre_fondo, cos, cus, \
    estado_obra, estado_pago, estado_verificacion, fecha_inspeccion, notas_inspeccion, \
    director_id, recibo_de_pago, folio_pago, fecha_pago, total_conceptos, \
    created_at, updated_at";

#[derive(Clone)]
pub struct ObraRepository {
    pool: PgPool,
}

impl ObraRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  OBRA
    // =========================================================================

    pub async fn insert_obra<'e, E>(
        &self,
        executor: E,
        datos: &ObraDatosPayload,
    ) -> Result<Obra, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO obras (
                propietario, tipo_propietario, representante_legal, identificacion,
                domicilio_propietario, telefono,
                colonia_id, manzana, lote, etapa, condominio,
                destino_actual, destino_propuesto, descripcion_proyecto,
                agua_potable, drenaje, energia_electrica,
                servidumbre_frente, servidumbre_lateral, servidumbre_fondo, cos, cus
            )
            VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11,
                $12, $13, $14, $15, $16, $17, $18, $19, $20, $21, $22
            )
            RETURNING {OBRA_COLS}
            "#
        );

        let obra = sqlx::query_as::<_, Obra>(&sql)
            .bind(&datos.propietario)
            .bind(datos.tipo_propietario)
            .bind(&datos.representante_legal)
            .bind(&datos.identificacion)
            .bind(&datos.domicilio_propietario)
            .bind(&datos.telefono)
            .bind(datos.colonia_id)
            .bind(&datos.manzana)
            .bind(&datos.lote)
            .bind(&datos.etapa)
            .bind(&datos.condominio)
            .bind(&datos.destino_actual)
            .bind(&datos.destino_propuesto)
            .bind(&datos.descripcion_proyecto)
            .bind(datos.agua_potable)
            .bind(datos.drenaje)
            .bind(datos.energia_electrica)
            .bind(datos.servidumbre_frente)
            .bind(datos.servidumbre_lateral)
            .bind(datos.servidumbre_fondo)
            .bind(datos.cos)
            .bind(datos.cus)
            .fetch_one(executor)
            .await?;

        Ok(obra)
    }

    pub async fn update_obra<'e, E>(
        &self,
        executor: E,
        obra_id: i64,
        datos: &ObraDatosPayload,
    ) -> Result<Option<Obra>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE obras SET
                propietario = $1, tipo_propietario = $2, representante_legal = $3,
                identificacion = $4, domicilio_propietario = $5, telefono = $6,
                colonia_id = $7, manzana = $8, lote = $9, etapa = $10, condominio = $11,
                destino_actual = $12, destino_propuesto = $13, descripcion_proyecto = $14,
                agua_potable = $15, drenaje = $16, energia_electrica = $17,
                servidumbre_frente = $18, servidumbre_lateral = $19, servidumbre_fondo = $20,
                cos = $21, cus = $22,
                updated_at = NOW()
            WHERE id = $23
            RETURNING {OBRA_COLS}
            "#
        );

        let obra = sqlx::query_as::<_, Obra>(&sql)
            .bind(&datos.propietario)
            .bind(datos.tipo_propietario)
            .bind(&datos.representante_legal)
            .bind(&datos.identificacion)
            .bind(&datos.domicilio_propietario)
            .bind(&datos.telefono)
            .bind(datos.colonia_id)
            .bind(&datos.manzana)
            .bind(&datos.lote)
            .bind(&datos.etapa)
            .bind(&datos.condominio)
            .bind(&datos.destino_actual)
            .bind(&datos.destino_propuesto)
            .bind(&datos.descripcion_proyecto)
            .bind(datos.agua_potable)
            .bind(datos.drenaje)
            .bind(datos.energia_electrica)
            .bind(datos.servidumbre_frente)
            .bind(datos.servidumbre_lateral)
            .bind(datos.servidumbre_fondo)
            .bind(datos.cos)
            .bind(datos.cus)
            .bind(obra_id)
            .fetch_optional(executor)
            .await?;

        Ok(obra)
    }

    pub async fn get_obra(&self, obra_id: i64) -> Result<Option<Obra>, AppError> {
        let sql = format!("SELECT {OBRA_COLS} FROM obras WHERE id = $1");
        let obra = sqlx::query_as::<_, Obra>(&sql)
            .bind(obra_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(obra)
    }

    // Bloquea la fila mientras dura la transacción. Así el guardado del paso 3
    // y las transiciones leen el estado persistido vigente, no uno viejo.
    pub async fn get_obra_for_update<'e, E>(
        &self,
        executor: E,
        obra_id: i64,
    ) -> Result<Option<Obra>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {OBRA_COLS} FROM obras WHERE id = $1 FOR UPDATE");
        let obra = sqlx::query_as::<_, Obra>(&sql)
            .bind(obra_id)
            .fetch_optional(executor)
            .await?;
        Ok(obra)
    }

    // Listado filtrado y paginado. Los filtros en NULL no restringen.
    pub async fn listar_filtrado(
        &self,
        propietario: Option<&str>,
        estado: Option<EstadoObra>,
        colonia_id: Option<i64>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Obra>, i64), AppError> {
        let where_clause = r#"
            WHERE ($1::text IS NULL OR propietario ILIKE '%' || $1 || '%')
              AND ($2::estado_obra IS NULL OR estado_obra = $2)
              AND ($3::bigint IS NULL OR colonia_id = $3)
        "#;

        let sql = format!(
            "SELECT {OBRA_COLS} FROM obras {where_clause} ORDER BY id DESC LIMIT $4 OFFSET $5"
        );
        let items = sqlx::query_as::<_, Obra>(&sql)
            .bind(propietario)
            .bind(estado)
            .bind(colonia_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let total: i64 =
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM obras {where_clause}"))
                .bind(propietario)
                .bind(estado)
                .bind(colonia_id)
                .fetch_one(&self.pool)
                .await?;

        Ok((items, total))
    }

    // El consecutivo solo se asigna la primera vez (COALESCE conserva el previo).
    pub async fn asignar_tramite<'e, E>(
        &self,
        executor: E,
        obra_id: i64,
        tramite_id: i64,
        consecutivo: &str,
    ) -> Result<Option<Obra>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE obras
            SET tramite_id = $1,
                consecutivo = COALESCE(consecutivo, $2),
                updated_at = NOW()
            WHERE id = $3
            RETURNING {OBRA_COLS}
            "#
        );
        let obra = sqlx::query_as::<_, Obra>(&sql)
            .bind(tramite_id)
            .bind(consecutivo)
            .bind(obra_id)
            .fetch_optional(executor)
            .await?;
        Ok(obra)
    }

    pub async fn guardar_verificacion<'e, E>(
        &self,
        executor: E,
        obra_id: i64,
        datos: &VerificacionPayload,
        estado_obra: EstadoObra,
        estado_pago: EstadoPago,
    ) -> Result<Obra, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE obras SET
                estado_verificacion = $1, fecha_inspeccion = $2, notas_inspeccion = $3,
                director_id = $4, recibo_de_pago = $5, folio_pago = $6, fecha_pago = $7,
                estado_obra = $8, estado_pago = $9,
                updated_at = NOW()
            WHERE id = $10
            RETURNING {OBRA_COLS}
            "#
        );
        let obra = sqlx::query_as::<_, Obra>(&sql)
            .bind(datos.estado_verificacion)
            .bind(datos.fecha_inspeccion)
            .bind(&datos.notas_inspeccion)
            .bind(datos.director_id)
            .bind(&datos.recibo_de_pago)
            .bind(&datos.folio_pago)
            .bind(datos.fecha_pago)
            .bind(estado_obra)
            .bind(estado_pago)
            .bind(obra_id)
            .fetch_one(executor)
            .await?;
        Ok(obra)
    }

    pub async fn actualizar_estado<'e, E>(
        &self,
        executor: E,
        obra_id: i64,
        estado: EstadoObra,
    ) -> Result<Obra, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "UPDATE obras SET estado_obra = $1, updated_at = NOW() WHERE id = $2 RETURNING {OBRA_COLS}"
        );
        let obra = sqlx::query_as::<_, Obra>(&sql)
            .bind(estado)
            .bind(obra_id)
            .fetch_one(executor)
            .await?;
        Ok(obra)
    }

    // =========================================================================
    //  CALLES / NÚMEROS OFICIALES
    // =========================================================================

    // Reemplaza el conjunto completo; se llama dentro de la transacción
    // de creación o edición del paso 1.
    pub async fn replace_calles(
        &self,
        conn: &mut sqlx::PgConnection,
        obra_id: i64,
        calles: &[(String, String)],
    ) -> Result<(), AppError> {
        sqlx::query("DELETE FROM obra_calles WHERE obra_id = $1")
            .bind(obra_id)
            .execute(&mut *conn)
            .await?;

        for (calle, numero_oficial) in calles {
            sqlx::query(
                "INSERT INTO obra_calles (obra_id, calle, numero_oficial) VALUES ($1, $2, $3)",
            )
            .bind(obra_id)
            .bind(calle)
            .bind(numero_oficial)
            .execute(&mut *conn)
            .await?;
        }

        Ok(())
    }

    pub async fn get_calles(&self, obra_id: i64) -> Result<Vec<ObraCalle>, AppError> {
        let calles = sqlx::query_as::<_, ObraCalle>(
            "SELECT id, obra_id, calle, numero_oficial FROM obra_calles WHERE obra_id = $1 ORDER BY id",
        )
        .bind(obra_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(calles)
    }

    // =========================================================================
    //  LUGARES RECIBIDOS
    // =========================================================================

    // La fila nace junto con la obra, todo en "No".
    pub async fn insert_lugares<'e, E>(&self, executor: E, obra_id: i64) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("INSERT INTO lugares_recibidos (obra_id) VALUES ($1)")
            .bind(obra_id)
            .execute(executor)
            .await?;
        Ok(())
    }

    pub async fn get_lugares<'e, E>(
        &self,
        executor: E,
        obra_id: i64,
    ) -> Result<Option<LugaresRecibidos>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let lugares = sqlx::query_as::<_, LugaresRecibidos>(
            "SELECT obra_id, secretaria, presidencia, padron FROM lugares_recibidos WHERE obra_id = $1",
        )
        .bind(obra_id)
        .fetch_optional(executor)
        .await?;
        Ok(lugares)
    }

    pub async fn update_lugares<'e, E>(
        &self,
        executor: E,
        obra_id: i64,
        secretaria: SiNo,
        presidencia: SiNo,
        padron: SiNo,
    ) -> Result<Option<LugaresRecibidos>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let lugares = sqlx::query_as::<_, LugaresRecibidos>(
            r#"
            UPDATE lugares_recibidos
            SET secretaria = $1, presidencia = $2, padron = $3, updated_at = NOW()
            WHERE obra_id = $4
            RETURNING obra_id, secretaria, presidencia, padron
            "#,
        )
        .bind(secretaria)
        .bind(presidencia)
        .bind(padron)
        .bind(obra_id)
        .fetch_optional(executor)
        .await?;
        Ok(lugares)
    }
}
